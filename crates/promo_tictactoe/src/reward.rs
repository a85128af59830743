//! Rewards issued when the human wins.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Symbols promo codes are drawn from.
pub const PROMO_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated promo code.
pub const PROMO_CODE_LEN: usize = 5;

/// Opaque token handed to the player after a win.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::From)]
#[serde(transparent)]
pub struct RewardToken(String);

impl RewardToken {
    /// Borrows the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Source of reward tokens.
///
/// Returning `None` means no token could be obtained; the win stands
/// regardless.
pub trait RewardIssuer {
    /// Issues a token for a human win.
    fn issue(&self) -> Option<RewardToken>;
}

impl<F> RewardIssuer for F
where
    F: Fn() -> Option<RewardToken>,
{
    fn issue(&self) -> Option<RewardToken> {
        self()
    }
}

/// Issuer that never hands out a token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoReward;

impl RewardIssuer for NoReward {
    fn issue(&self) -> Option<RewardToken> {
        None
    }
}

/// Issues five-character alphanumeric promo codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromoCodeIssuer;

impl PromoCodeIssuer {
    /// Draws a code from `rng`, each symbol uniform over [`PROMO_ALPHABET`].
    #[instrument(skip(rng))]
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> RewardToken {
        let code: String = (0..PROMO_CODE_LEN)
            .map(|_| char::from(PROMO_ALPHABET[rng.random_range(0..PROMO_ALPHABET.len())]))
            .collect();
        debug!(code = %code, "Generated promo code");
        RewardToken(code)
    }
}

impl RewardIssuer for PromoCodeIssuer {
    fn issue(&self) -> Option<RewardToken> {
        Some(Self::generate(&mut rand::rng()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_promo_code_shape() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let code = PromoCodeIssuer::generate(&mut rng);
            assert_eq!(code.as_str().len(), PROMO_CODE_LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_issuers() {
        assert!(PromoCodeIssuer.issue().is_some());
        assert_eq!(NoReward.issue(), None);
        let fixed = || Some(RewardToken::from("A7K3D".to_string()));
        assert_eq!(fixed.issue().unwrap().to_string(), "A7K3D");
    }
}
