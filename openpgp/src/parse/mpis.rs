//! Functions for parsing MPIs.

use crate::Error;
use crate::Result;
use crate::crypto::mpi::{self, MPI};
use crate::parse::Reader;
use crate::types::{
    Curve,
    HashAlgorithm,
    PublicKeyAlgorithm,
    SymmetricAlgorithm,
};

impl mpi::PublicKey {
    /// Parses a set of OpenPGP MPIs representing a public key.
    ///
    /// See [Section 3.2 of RFC 4880] for details.
    ///
    ///   [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2
    pub fn parse(algo: PublicKeyAlgorithm, data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let mpis = public_key_parse(algo, &mut reader)?;
        reader.expect_end()?;
        Ok(mpis)
    }
}

/// Parses a set of OpenPGP MPIs representing a public key.
pub(crate) fn public_key_parse(algo: PublicKeyAlgorithm, reader: &mut Reader)
                               -> Result<mpi::PublicKey>
{
    use crate::types::PublicKeyAlgorithm::*;

    match algo {
        RSAEncryptSign | RSAEncrypt | RSASign => {
            let n = MPI::parse(reader)?;
            let e = MPI::parse(reader)?;

            Ok(mpi::PublicKey::RSA { e, n })
        }

        DSA => {
            let p = MPI::parse(reader)?;
            let q = MPI::parse(reader)?;
            let g = MPI::parse(reader)?;
            let y = MPI::parse(reader)?;

            Ok(mpi::PublicKey::DSA {
                p,
                q,
                g,
                y,
            })
        }

        ElGamalEncrypt | ElGamalEncryptSign => {
            let p = MPI::parse(reader)?;
            let g = MPI::parse(reader)?;
            let y = MPI::parse(reader)?;

            Ok(mpi::PublicKey::ElGamal {
                p,
                g,
                y,
            })
        }

        EdDSA => {
            let curve = Curve::parse(reader)?;
            let q = MPI::parse(reader)?;

            Ok(mpi::PublicKey::EdDSA {
                curve,
                q,
            })
        }

        ECDSA => {
            let curve = Curve::parse(reader)?;
            let q = MPI::parse(reader)?;

            Ok(mpi::PublicKey::ECDSA {
                curve,
                q,
            })
        }

        ECDH => {
            let curve = Curve::parse(reader)?;
            let q = MPI::parse(reader)?;

            let kdf_len = reader.u8()?;
            if kdf_len != 3 {
                return Err(Error::MalformedPacket(
                    "wrong kdf length".into()).into());
            }

            let reserved = reader.u8()?;
            if reserved != 1 {
                return Err(Error::MalformedPacket(
                    format!("Reserved kdf field must be 0x01, got 0x{:x}",
                            reserved)).into());
            }
            let hash: HashAlgorithm = reader.u8()?.into();
            let sym: SymmetricAlgorithm = reader.u8()?.into();

            Ok(mpi::PublicKey::ECDH {
                curve,
                q,
                hash,
                sym,
            })
        }

        Unknown(_) | Private(_) => {
            let mut mpis = Vec::new();
            loop {
                let save = *reader;
                match MPI::parse(reader) {
                    Ok(mpi) => mpis.push(mpi),
                    Err(_) => {
                        *reader = save;
                        break;
                    },
                }
            }
            let rest = reader.rest();

            Ok(mpi::PublicKey::Unknown {
                mpis: mpis.into_boxed_slice(),
                rest: rest.to_vec().into_boxed_slice(),
            })
        }
    }
}

impl mpi::Signature {
    /// Parses a set of OpenPGP MPIs representing a signature.
    ///
    /// See [Section 3.2 of RFC 4880] for details.
    ///
    ///   [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2
    pub fn parse(algo: PublicKeyAlgorithm, data: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(data);
        let mpis = signature_parse(algo, &mut reader)?;
        reader.expect_end()?;
        Ok(mpis)
    }
}

/// Parses a set of OpenPGP MPIs representing a signature.
pub(crate) fn signature_parse(algo: PublicKeyAlgorithm, reader: &mut Reader)
                              -> Result<mpi::Signature>
{
    use crate::types::PublicKeyAlgorithm::*;

    match algo {
        RSAEncryptSign | RSAEncrypt | RSASign => {
            let s = MPI::parse(reader)?;

            Ok(mpi::Signature::RSA { s })
        }

        DSA => {
            let r = MPI::parse(reader)?;
            let s = MPI::parse(reader)?;

            Ok(mpi::Signature::DSA { r, s })
        }

        ECDSA => {
            let r = MPI::parse(reader)?;
            let s = MPI::parse(reader)?;

            Ok(mpi::Signature::ECDSA { r, s })
        }

        EdDSA => {
            let r = MPI::parse(reader)?;
            let s = MPI::parse(reader)?;

            Ok(mpi::Signature::EdDSA { r, s })
        }

        // Everything else, including the ElGamal variants, is
        // carried as an opaque sequence of MPIs.
        _ => {
            let mut mpis = Vec::new();
            loop {
                let save = *reader;
                match MPI::parse(reader) {
                    Ok(mpi) => mpis.push(mpi),
                    Err(_) => {
                        *reader = save;
                        break;
                    },
                }
            }
            let rest = reader.rest();

            Ok(mpi::Signature::Unknown {
                mpis: mpis.into_boxed_slice(),
                rest: rest.to_vec().into_boxed_slice(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::MarshalInto;

    quickcheck! {
        fn roundtrip_public_key(pk: mpi::PublicKey) -> bool {
            let buf = pk.to_vec().unwrap();
            let algo = pk.algo().expect("arbitrary generates known algos");
            let q = mpi::PublicKey::parse(algo, &buf).unwrap();
            pk == q
        }
    }

    #[test]
    fn unknown_algo_roundtrip() {
        // Two MPIs and three octets of trailing cruft.
        let buf: &[u8] = &[0x00, 0x02, 0x03,
                           0x00, 0x01, 0x01,
                           0xff, 0x00, 0x01];
        let pk = mpi::PublicKey::parse(
            PublicKeyAlgorithm::Unknown(99), buf).unwrap();
        match &pk {
            mpi::PublicKey::Unknown { mpis, rest } => {
                assert_eq!(mpis.len(), 2);
                assert_eq!(&rest[..], &[0xff, 0x00, 0x01]);
            },
            _ => panic!("expected unknown material"),
        }
        assert_eq!(pk.to_vec().unwrap(), buf);
    }

    #[test]
    fn non_minimal_mpi_is_rejected() {
        // Declared 16 bits, but the leading octet is zero.
        assert!(MPI::parse(&mut Reader::new(&[0x00, 0x10, 0x00, 0x42]))
                .is_err());
        // Declared 2 bits, value has 8.
        assert!(MPI::parse(&mut Reader::new(&[0x00, 0x02, 0x80])).is_err());
    }

    #[test]
    fn truncated_mpi() {
        let err = MPI::parse(&mut Reader::new(&[0x00, 0x20, 0xff]))
            .unwrap_err();
        match err.downcast_ref::<crate::Error>() {
            Some(crate::Error::Truncated(n)) => assert_eq!(*n, 3),
            e => panic!("expected Truncated, got {:?}", e),
        }
    }
}
