//! Implementation of conversions from and to polynomials.

use super::{traits::TryConvertFrom, Context, Poly, Representation};
use crate::{Error, Result};
use itertools::izip;
use ndarray::{Array2, Axis};
use num_bigint::BigUint;
use std::sync::Arc;

impl From<&Poly> for Vec<u64> {
    /// The residues of the polynomial, modulus by modulus.
    fn from(p: &Poly) -> Self {
        p.coefficients.iter().copied().collect()
    }
}

impl From<&Poly> for Vec<BigUint> {
    /// The coefficients of the polynomial lifted to [0, q).
    fn from(p: &Poly) -> Self {
        p.coefficients
            .axis_iter(Axis(1))
            .map(|column| p.ctx.rns.lift(column))
            .collect()
    }
}

impl TryConvertFrom<Array2<u64>> for Poly {
    fn try_convert_from(
        value: Array2<u64>,
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        if value.dim() != (ctx.q.len(), ctx.degree) {
            return Err(Error::Default(
                "The array of coefficient does not have the correct shape".to_string(),
            ));
        }
        for (row, qi) in izip!(value.outer_iter(), ctx.q.iter()) {
            if row.iter().any(|c| *c >= qi.modulus()) {
                return Err(Error::Default(
                    "The coefficients are not reduced modulo the moduli".to_string(),
                ));
            }
        }
        Ok(Self {
            ctx: ctx.clone(),
            representation,
            coefficients: value.as_standard_layout().into_owned(),
        })
    }
}

impl TryConvertFrom<&[u64]> for Poly {
    /// Each value is reduced modulo every modulus of the context; at most
    /// `degree` values are accepted, and missing ones are set to 0.
    fn try_convert_from(
        value: &[u64],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        if value.len() > ctx.degree {
            return Err(Error::Default(
                "The slice contains too many values".to_string(),
            ));
        }
        let mut p = Poly::zero(ctx, representation);
        for (mut row, qi) in izip!(p.coefficients.outer_iter_mut(), ctx.q.iter()) {
            for (c, v) in izip!(row.iter_mut(), value.iter()) {
                *c = qi.reduce(*v);
            }
        }
        Ok(p)
    }
}

impl TryConvertFrom<&[i64]> for Poly {
    fn try_convert_from(
        value: &[i64],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        if value.len() > ctx.degree {
            return Err(Error::Default(
                "The slice contains too many values".to_string(),
            ));
        }
        let mut p = Poly::zero(ctx, representation);
        for (mut row, qi) in izip!(p.coefficients.outer_iter_mut(), ctx.q.iter()) {
            for (c, v) in izip!(row.iter_mut(), value.iter()) {
                *c = qi.reduce_i64(*v);
            }
        }
        Ok(p)
    }
}

impl TryConvertFrom<&[BigUint]> for Poly {
    fn try_convert_from(
        value: &[BigUint],
        ctx: &Arc<Context>,
        representation: Representation,
    ) -> Result<Self> {
        if value.len() > ctx.degree {
            return Err(Error::Default(
                "The slice contains too many values".to_string(),
            ));
        }
        let mut p = Poly::zero(ctx, representation);
        for (mut column, v) in izip!(p.coefficients.axis_iter_mut(Axis(1)), value.iter()) {
            for (c, r) in izip!(column.iter_mut(), ctx.rns.project(v)) {
                *c = r;
            }
        }
        Ok(p)
    }
}
