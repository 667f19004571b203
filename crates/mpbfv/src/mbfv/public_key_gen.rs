use std::sync::Arc;

use crate::bfv::{BfvParameters, PublicKey, SecretKey};
use crate::proto::mbfv::PublicKeyShare as PublicKeyShareProto;
use crate::{Error, Result};
use mpbfv_math::rq::{Poly, Representation};
use mpbfv_traits::{DeserializeWithContext, Serialize};
use prost::Message;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use super::{Aggregate, CommonRandomPoly, Role};

/// A party's share in the public key generation protocol.
///
/// Each party uses the `PublicKeyShare` to generate their share of the public
/// key and participate in the "Protocol 1: EncKeyGen", as detailed in
/// [Multiparty BFV](https://eprint.iacr.org/2020/304.pdf) (p6). Use the
/// [`Aggregate`] impl to combine the shares into a [`PublicKey`].
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PublicKeyShare {
    pub(crate) par: Arc<BfvParameters>,
    pub(crate) crp: CommonRandomPoly,
    pub(crate) role: Role,
    pub(crate) p0_share: Poly,
}

impl PublicKeyShare {
    /// Participate in a new EncKeyGen protocol.
    ///
    /// 1. *Private input*: BFV secret key share
    /// 2. *Public input*: common random polynomial
    ///
    /// The share is -a * s_i + e_i, with `a` the common random polynomial.
    pub fn new<R: RngCore + CryptoRng>(
        role: Role,
        sk_share: &SecretKey,
        crp: CommonRandomPoly,
        rng: &mut R,
    ) -> Result<Self> {
        let par = sk_share.par.clone();
        if crp.poly.ctx() != &par.ctx {
            return Err(Error::DefaultError(
                "Incompatible BFV parameters".to_string(),
            ));
        }

        let s = sk_share.to_poly()?;
        let e = Zeroizing::new(Poly::small(&par.ctx, Representation::Ntt, par.variance, rng)?);

        let mut p0_share = -&crp.poly;
        p0_share *= &*s;
        p0_share += &*e;

        Ok(Self {
            par,
            crp,
            role,
            p0_share,
        })
    }

    /// The role of the party that produced the share.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Deserialize a PublicKeyShare from bytes with the given parameters.
    pub fn deserialize(bytes: &[u8], par: &Arc<BfvParameters>) -> Result<Self> {
        let proto: PublicKeyShareProto =
            Message::decode(bytes).map_err(|_| Error::SerializationError)?;
        Ok(Self {
            par: par.clone(),
            crp: CommonRandomPoly::deserialize(&proto.crp, par)?,
            role: Role::try_from(proto.role)?,
            p0_share: Poly::from_bytes(&proto.p0_share, &par.ctx)?,
        })
    }
}

impl Aggregate<PublicKeyShare> for PublicKey {
    fn from_shares<T>(iter: T) -> Result<Self>
    where
        T: IntoIterator<Item = PublicKeyShare>,
    {
        let mut shares = iter.into_iter();
        let share = shares.next().ok_or(Error::TooFewValues(0, 1))?;
        let mut num_leads = usize::from(share.role.is_lead());
        let mut p0 = share.p0_share;
        for sh in shares {
            if sh.par != share.par {
                return Err(Error::DefaultError(
                    "Incompatible BFV parameters".to_string(),
                ));
            }
            if sh.crp != share.crp {
                return Err(Error::DefaultError(
                    "Shares use different common random polynomials".to_string(),
                ));
            }
            num_leads += usize::from(sh.role.is_lead());
            p0 += &sh.p0_share;
        }

        match num_leads {
            0 => Err(Error::MissingLeadShare),
            1 => PublicKey::from_polys(p0, share.crp.poly, &share.par),
            _ => Err(Error::TooManyLeadShares),
        }
    }
}

impl Serialize for PublicKeyShare {
    fn to_bytes(&self) -> Vec<u8> {
        PublicKeyShareProto {
            p0_share: self.p0_share.to_bytes(),
            crp: self.crp.to_bytes(),
            role: self.role.into(),
        }
        .encode_to_vec()
    }
}
