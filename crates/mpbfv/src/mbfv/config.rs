//! Configuration of a multiparty session.
//!
//! A [`ProtocolConfig`] describes the parties and the BFV parameters they
//! agree on; it can be shared between the parties in any serde format.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::bfv::{BfvParameters, BfvParametersBuilder};
use crate::{Error, Result};

/// Description of a multiparty session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Number of parties holding a share of the secret key.
    pub num_parties: usize,
    /// Degree of the polynomials.
    pub degree: usize,
    /// Plaintext modulus t.
    pub plaintext_modulus: u64,
    /// Sizes in bits of the ciphertext moduli. At least two are required.
    pub moduli_sizes: Vec<usize>,
    /// Variance of the error distribution.
    pub variance: usize,
    /// Variance of the noise added to partial decryptions. Follows
    /// `variance` when unset.
    pub smudging_variance: Option<usize>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            num_parties: 5,
            degree: 16,
            plaintext_modulus: 65537,
            moduli_sizes: vec![62; 4],
            variance: 10,
            smudging_variance: None,
        }
    }
}

impl ProtocolConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_num_parties(self.num_parties)?;
        validate_variance(self.variance)?;
        if let Some(smudging_variance) = self.smudging_variance {
            validate_smudging_variance(smudging_variance)?;
        }
        Ok(())
    }

    /// Validates the configuration and builds the BFV parameters it describes.
    pub fn build_parameters(&self) -> Result<Arc<BfvParameters>> {
        self.validate()?;
        let mut builder = BfvParametersBuilder::new();
        builder
            .set_degree(self.degree)
            .set_plaintext_modulus(self.plaintext_modulus)
            .set_moduli_sizes(&self.moduli_sizes)
            .set_variance(self.variance);
        if let Some(smudging_variance) = self.smudging_variance {
            builder.set_smudging_variance(smudging_variance);
        }
        builder.build_arc()
    }
}

/// Validates the number of parties of a session.
pub fn validate_num_parties(num_parties: usize) -> Result<()> {
    if num_parties == 0 {
        return Err(Error::TooFewValues(0, 1));
    }
    Ok(())
}

/// Validates the variance of the error distribution.
pub fn validate_variance(variance: usize) -> Result<()> {
    if variance == 0 || variance > 16 {
        return Err(Error::UnspecifiedInput(format!(
            "The variance should be between 1 and 16, found {variance}"
        )));
    }
    Ok(())
}

/// Validates the smudging variance.
pub fn validate_smudging_variance(variance: usize) -> Result<()> {
    if variance == 0 {
        return Err(Error::UnspecifiedInput(
            "Smudging variance must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParametersError;

    #[test]
    fn default_config() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let config = ProtocolConfig::default();
        assert!(config.validate().is_ok());
        let par = config.build_parameters()?;
        assert_eq!(par.degree(), 16);
        assert_eq!(par.plaintext(), 65537);
        assert_eq!(par.moduli().len(), 4);
        assert_eq!(par.smudging_variance(), par.variance());
        assert!(par.supports_simd());
        Ok(())
    }

    #[test]
    fn invalid_config() {
        let config = ProtocolConfig {
            num_parties: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(Error::TooFewValues(0, 1)));

        let config = ProtocolConfig {
            smudging_variance: Some(0),
            ..Default::default()
        };
        assert!(config.build_parameters().is_err());

        let config = ProtocolConfig {
            variance: 17,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ProtocolConfig {
            degree: 12,
            ..Default::default()
        };
        assert!(config.build_parameters().is_err());

        let config = ProtocolConfig {
            moduli_sizes: vec![62],
            ..Default::default()
        };
        assert!(matches!(
            config.build_parameters(),
            Err(Error::ParametersError(ParametersError::TooFewSpecified(_)))
        ));
    }

    #[test]
    fn json() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let config: ProtocolConfig =
            serde_json::from_str(r#"{ "num_parties": 3, "smudging_variance": 12 }"#)?;
        assert_eq!(config.num_parties, 3);
        assert_eq!(config.degree, 16);
        assert_eq!(config.smudging_variance, Some(12));
        assert_eq!(config.build_parameters()?.smudging_variance(), 12);

        let json = serde_json::to_string(&config)?;
        assert_eq!(serde_json::from_str::<ProtocolConfig>(&json)?, config);
        Ok(())
    }
}
