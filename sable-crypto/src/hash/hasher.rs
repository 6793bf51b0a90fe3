use crate::hash::{Checksum160, Checksum256, Checksum512};
use cryptoxide::digest::Digest as _;

macro_rules! cryptoxide_hasher {
    ($name:ident, $inner:ty, $checksum:ty, $bytes:literal) => {
        /// Streaming hasher; see the module docs for usage.
        pub struct $name($inner);

        impl $name {
            #[inline]
            pub fn new() -> Self {
                Self(<$inner>::new())
            }

            /// update the hasher with the given input bytes
            #[inline]
            pub fn input(&mut self, bytes: &[u8]) {
                self.0.input(bytes);
            }

            /// convenient function to directly generate the digest of the
            /// given bytes without going through the streaming interface
            #[inline]
            pub fn hash(bytes: &[u8]) -> $checksum {
                let mut hasher = Self::new();
                hasher.input(bytes);
                hasher.finalize()
            }

            /// consume the hasher and return the computed digest
            pub fn finalize(mut self) -> $checksum {
                let mut out = [0; $bytes];
                self.0.result(&mut out);
                out.into()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

cryptoxide_hasher!(Sha256, cryptoxide::sha2::Sha256, Checksum256, 32);
cryptoxide_hasher!(Sha512, cryptoxide::sha2::Sha512, Checksum512, 64);

/// Streaming RIPEMD-160 hasher, used for key string checksums and the
/// legacy public key form.
pub struct Ripemd160(ripemd::Ripemd160);

impl Ripemd160 {
    #[inline]
    pub fn new() -> Self {
        use ripemd::Digest as _;
        Self(ripemd::Ripemd160::new())
    }

    #[inline]
    pub fn input(&mut self, bytes: &[u8]) {
        use ripemd::Digest as _;
        self.0.update(bytes);
    }

    #[inline]
    pub fn hash(bytes: &[u8]) -> Checksum160 {
        let mut hasher = Self::new();
        hasher.input(bytes);
        hasher.finalize()
    }

    pub fn finalize(self) -> Checksum160 {
        use ripemd::Digest as _;
        let out: [u8; 20] = self.0.finalize().into();
        out.into()
    }
}

impl Default for Ripemd160 {
    fn default() -> Self {
        Self::new()
    }
}

/// SHA-256 applied twice, the WIF checksum function.
pub fn double_sha256(bytes: &[u8]) -> Checksum256 {
    Sha256::hash(Sha256::hash(bytes).as_ref())
}
