use bip39::{Language, Mnemonic};
use rand::RngCore;
use secrecy::SecretString;
use tracing::debug;

use crate::blockchain::models::SdkError;
use crate::blockchain::sdk::MnemonicSource;

/// English BIP39 phrases from the `bip39` crate.
#[derive(Debug, Clone, Copy)]
pub struct Bip39Mnemonic {
    word_count: usize,
}

impl Bip39Mnemonic {
    /// 12 or 24 words; anything else is rejected by `generate`.
    pub fn new(word_count: usize) -> Self {
        Self { word_count }
    }
}

impl Default for Bip39Mnemonic {
    fn default() -> Self {
        Self::new(12)
    }
}

impl MnemonicSource for Bip39Mnemonic {
    fn generate(&self) -> Result<SecretString, SdkError> {
        let entropy_len = match self.word_count {
            12 => 16,
            24 => 32,
            n => return Err(SdkError::Other(format!("unsupported word count {}", n))),
        };
        let mut entropy = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut entropy[..entropy_len]);
        let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy[..entropy_len])
            .map_err(|e| SdkError::Other(format!("failed to generate mnemonic: {}", e)))?;
        debug!("Generated {}-word mnemonic", self.word_count);
        Ok(SecretString::new(mnemonic.to_string()))
    }

    fn validate(&self, phrase: &str) -> bool {
        Mnemonic::parse_in_normalized(Language::English, phrase.trim()).is_ok()
    }
}
