//! 备份文件编解码：JSON → AES-256-CBC → `<hex IV>:<hex 密文>`
//!
//! 密钥由程序内置的固定口令和固定盐经 scrypt 派生，任何拿到源码的人都能算出同一把密钥。
//! 这只是混淆，不是安全边界；改动口令、盐或参数会让已导出的文件无法再导入。

use crate::package_manager::PackageRecord;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;
use std::sync::OnceLock;
use thiserror::Error;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const SECRET: &[u8] = b"easy-winget-manager-secret";
const SALT: &[u8] = b"salt";
/// scrypt N = 2^14, r = 8, p = 1
const SCRYPT_LOG_N: u8 = 14;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid file or corruption. (expected one ':' separator, found {0})")]
    Format(usize),

    #[error("Invalid file or corruption. (invalid hex: {0})")]
    Hex(#[from] hex::FromHexError),

    #[error("Invalid file or corruption. (IV must be 16 bytes, got {0})")]
    InvalidIv(usize),

    #[error("Invalid file or corruption. (decryption failed: bad padding or tampered data)")]
    Decrypt,

    #[error("Invalid file or corruption. (decrypted data is not UTF-8: {0})")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid file or corruption. ({0})")]
    Json(#[from] serde_json::Error),

    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),
}

pub type CodecResult<T> = Result<T, CodecError>;

static KEY: OnceLock<[u8; KEY_LEN]> = OnceLock::new();

fn derive_key() -> CodecResult<[u8; KEY_LEN]> {
    let params = scrypt::Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LEN)
        .map_err(|e| CodecError::KeyDerivation(e.to_string()))?;
    let mut key = [0u8; KEY_LEN];
    scrypt::scrypt(SECRET, SALT, &params, &mut key)
        .map_err(|e| CodecError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// 进程内只派生一次
fn key() -> CodecResult<&'static [u8; KEY_LEN]> {
    if let Some(key) = KEY.get() {
        return Ok(key);
    }
    let key = derive_key()?;
    Ok(KEY.get_or_init(|| key))
}

/// 将记录序列加密为文件内容，每次调用使用新的随机 IV
pub fn encode(records: &[PackageRecord]) -> CodecResult<String> {
    let json = serde_json::to_string(records)?;

    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let ciphertext = Aes256CbcEnc::new(GenericArray::from_slice(key()?), GenericArray::from_slice(&iv))
        .encrypt_padded_vec_mut::<Pkcs7>(json.as_bytes());

    Ok(format!("{}:{}", hex::encode(iv), hex::encode(ciphertext)))
}

/// 解密文件内容并还原记录序列
pub fn decode(blob: &str) -> CodecResult<Vec<PackageRecord>> {
    let blob = blob.trim();
    let separators = blob.matches(':').count();
    if separators != 1 {
        return Err(CodecError::Format(separators));
    }
    let (iv_hex, data_hex) = blob.split_once(':').ok_or(CodecError::Format(0))?;

    let iv = hex::decode(iv_hex)?;
    let iv: [u8; IV_LEN] = iv
        .as_slice()
        .try_into()
        .map_err(|_| CodecError::InvalidIv(iv.len()))?;
    let ciphertext = hex::decode(data_hex)?;

    let plaintext = Aes256CbcDec::new(GenericArray::from_slice(key()?), GenericArray::from_slice(&iv))
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|_| CodecError::Decrypt)?;

    let json = String::from_utf8(plaintext)?;
    let records: Vec<PackageRecord> = serde_json::from_str(&json)?;
    Ok(records)
}
