//! Implementation of serialization and deserialization.

use super::{traits::TryConvertFrom, Context, Poly, Representation};
use crate::{proto::Rq, Error};
use mpbfv_traits::{DeserializeWithContext, Serialize};
use ndarray::Array2;
use prost::Message;
use std::sync::Arc;

impl From<&Poly> for Rq {
    fn from(p: &Poly) -> Self {
        Rq {
            representation: match p.representation {
                Representation::PowerBasis => 1,
                Representation::Ntt => 2,
            },
            degree: p.ctx.degree as u32,
            coefficients: Vec::<u64>::from(p),
        }
    }
}

impl Serialize for Poly {
    fn to_bytes(&self) -> Vec<u8> {
        Rq::from(self).encode_to_vec()
    }
}

impl DeserializeWithContext for Poly {
    type Error = Error;
    type Context = Context;

    fn from_bytes(bytes: &[u8], ctx: &Arc<Context>) -> Result<Self, Self::Error> {
        let rq = Rq::decode(bytes).map_err(|e| Error::Serialization(e.to_string()))?;
        let representation = match rq.representation {
            1 => Representation::PowerBasis,
            2 => Representation::Ntt,
            _ => {
                return Err(Error::Serialization(
                    "Unknown polynomial representation".to_string(),
                ))
            }
        };
        if rq.degree as usize != ctx.degree {
            return Err(Error::Serialization("Mismatched degree".to_string()));
        }
        let coefficients = Array2::from_shape_vec((ctx.q.len(), ctx.degree), rq.coefficients)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        Poly::try_convert_from(coefficients, ctx, representation)
    }
}
