//! Implementation of operations over polynomials.

use super::{Poly, Representation};
use itertools::izip;
use num_bigint::BigUint;
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

impl AddAssign<&Poly> for Poly {
    fn add_assign(&mut self, p: &Poly) {
        assert_eq!(
            self.representation, p.representation,
            "Incompatible representations"
        );
        assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        for (mut v1, v2, qi) in izip!(
            self.coefficients.outer_iter_mut(),
            p.coefficients.outer_iter(),
            self.ctx.q.iter()
        ) {
            izip!(v1.iter_mut(), v2.iter()).for_each(|(a, b)| *a = qi.add(*a, *b));
        }
    }
}

impl Add<&Poly> for &Poly {
    type Output = Poly;
    fn add(self, p: &Poly) -> Poly {
        let mut q = self.clone();
        q += p;
        q
    }
}

impl Add for Poly {
    type Output = Poly;
    fn add(mut self, p: Poly) -> Poly {
        self += &p;
        self
    }
}

impl SubAssign<&Poly> for Poly {
    fn sub_assign(&mut self, p: &Poly) {
        assert_eq!(
            self.representation, p.representation,
            "Incompatible representations"
        );
        assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        for (mut v1, v2, qi) in izip!(
            self.coefficients.outer_iter_mut(),
            p.coefficients.outer_iter(),
            self.ctx.q.iter()
        ) {
            izip!(v1.iter_mut(), v2.iter()).for_each(|(a, b)| *a = qi.sub(*a, *b));
        }
    }
}

impl Sub<&Poly> for &Poly {
    type Output = Poly;
    fn sub(self, p: &Poly) -> Poly {
        let mut q = self.clone();
        q -= p;
        q
    }
}

impl MulAssign<&Poly> for Poly {
    /// Multiplication of polynomials; both must be in Ntt representation.
    fn mul_assign(&mut self, p: &Poly) {
        assert_eq!(
            self.representation,
            Representation::Ntt,
            "Multiplication requires an Ntt representation."
        );
        assert_eq!(
            p.representation,
            Representation::Ntt,
            "Multiplication requires an Ntt representation."
        );
        assert_eq!(self.ctx, p.ctx, "Incompatible contexts");
        for (mut v1, v2, qi) in izip!(
            self.coefficients.outer_iter_mut(),
            p.coefficients.outer_iter(),
            self.ctx.q.iter()
        ) {
            izip!(v1.iter_mut(), v2.iter()).for_each(|(a, b)| *a = qi.mul(*a, *b));
        }
    }
}

impl Mul<&Poly> for &Poly {
    type Output = Poly;
    fn mul(self, p: &Poly) -> Poly {
        let mut q = self.clone();
        q *= p;
        q
    }
}

impl MulAssign<&BigUint> for Poly {
    /// Multiplication by a scalar; valid in both representations.
    fn mul_assign(&mut self, p: &BigUint) {
        let rests = self.ctx.rns.project(p);
        for (mut v, qi, r) in izip!(
            self.coefficients.outer_iter_mut(),
            self.ctx.q.iter(),
            rests.iter()
        ) {
            v.iter_mut().for_each(|a| *a = qi.mul(*a, *r));
        }
    }
}

impl Mul<&BigUint> for &Poly {
    type Output = Poly;
    fn mul(self, p: &BigUint) -> Poly {
        let mut q = self.clone();
        q *= p;
        q
    }
}

impl Neg for &Poly {
    type Output = Poly;
    fn neg(self) -> Poly {
        -self.clone()
    }
}

impl Neg for Poly {
    type Output = Poly;
    fn neg(mut self) -> Poly {
        for (mut v, qi) in izip!(self.coefficients.outer_iter_mut(), self.ctx.q.iter()) {
            v.iter_mut().for_each(|a| *a = qi.neg(*a));
        }
        self
    }
}
