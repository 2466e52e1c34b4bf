//! The sponge abstraction shared by Curl-P and Kerl.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use trinary_types::{Result, TernaryError, Trit, TritHash, HASH_TRITS};

use crate::curl::{Curl, CurlRounds};
use crate::kerl::Kerl;

/// Usable portion of the state consumed or produced per permutation.
pub const RATE: usize = HASH_TRITS;

/// Absorb/squeeze construction over trits.
///
/// Inputs and outputs are processed in 243-trit chunks; lengths that are not
/// a positive multiple of [`RATE`] are rejected with `InvalidLength`.
pub trait Sponge {
    fn absorb(&mut self, trits: &[Trit]) -> Result<()>;

    fn squeeze(&mut self, out: &mut [Trit]) -> Result<()>;

    /// Return to the all-zero initial state.
    fn reset(&mut self);

    /// `reset`, `absorb(input)`, `squeeze(out)`.
    fn digest_into(&mut self, input: &[Trit], out: &mut [Trit]) -> Result<()> {
        self.reset();
        self.absorb(input)?;
        self.squeeze(out)
    }

    /// Hash `input` into a fresh 243-trit value.
    fn hash(&mut self, input: &[Trit]) -> Result<TritHash> {
        let mut out = [0; HASH_TRITS];
        self.digest_into(input, &mut out)?;
        Ok(TritHash::new(out))
    }
}

pub(crate) fn check_rate(len: usize) -> Result<()> {
    if len == 0 || len % RATE != 0 {
        return Err(TernaryError::multiple_of(RATE, len));
    }
    Ok(())
}

/// Selects a sponge variant at runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpongeKind {
    /// Curl-P with 27 rounds (baseline).
    #[serde(rename = "curl-p-27")]
    CurlP27,
    /// Curl-P with 81 rounds (hardened); transaction hashing and proof of work.
    #[serde(rename = "curl-p-81")]
    CurlP81,
    /// Keccak-384 over ternary; bundle hashes and key derivation.
    #[default]
    #[serde(rename = "kerl")]
    Kerl,
}

impl SpongeKind {
    pub fn sponge(self) -> AnySponge {
        match self {
            Self::CurlP27 => AnySponge::Curl(Curl::new(CurlRounds::P27)),
            Self::CurlP81 => AnySponge::Curl(Curl::new(CurlRounds::P81)),
            Self::Kerl => AnySponge::Kerl(Kerl::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CurlP27 => "curl-p-27",
            Self::CurlP81 => "curl-p-81",
            Self::Kerl => "kerl",
        }
    }
}

impl fmt::Display for SpongeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpongeKind {
    type Err = TernaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "curl-p-27" | "curlp27" => Ok(Self::CurlP27),
            "curl-p-81" | "curlp81" => Ok(Self::CurlP81),
            "kerl" => Ok(Self::Kerl),
            other => Err(TernaryError::InvalidParameter(format!(
                "unknown sponge {other:?}"
            ))),
        }
    }
}

/// A sponge of any supported kind, dispatched without boxing.
#[derive(Clone)]
pub enum AnySponge {
    Curl(Curl),
    Kerl(Kerl),
}

impl Sponge for AnySponge {
    fn absorb(&mut self, trits: &[Trit]) -> Result<()> {
        match self {
            Self::Curl(curl) => curl.absorb(trits),
            Self::Kerl(kerl) => kerl.absorb(trits),
        }
    }

    fn squeeze(&mut self, out: &mut [Trit]) -> Result<()> {
        match self {
            Self::Curl(curl) => curl.squeeze(out),
            Self::Kerl(kerl) => kerl.squeeze(out),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Curl(curl) => curl.reset(),
            Self::Kerl(kerl) => kerl.reset(),
        }
    }
}
