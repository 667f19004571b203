//! In-process drivers of the multiparty protocols.
//!
//! Each driver plays every party of a session: the local steps of the parties
//! run in parallel whenever they are independent within a round, and their
//! contributions are collected in a [`Round`] before being aggregated. Every
//! party draws from its own `ChaCha20Rng`, seeded from the caller's generator,
//! so that seeded runs are reproducible.

use std::sync::Arc;

use rand::{CryptoRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use tracing::{debug, instrument, trace};

use crate::bfv::{
    BfvParameters, Ciphertext, EvaluationKey, Plaintext, PublicKey, RelinearizationKey, SecretKey,
};
use crate::{Error, Result};

use super::config::validate_num_parties;
use super::{
    CommonRandomPoly, DecryptionShare, EncryptionShare, KeySwitchAccumulator, MessageShare,
    PublicKeyShare, RelinKeyShare, Role, RotationKeyAccumulator, Round,
};

/// One generator per party, seeded from `rng`.
fn fork_rngs<R: RngCore + CryptoRng>(rng: &mut R, num_parties: usize) -> Vec<ChaCha20Rng> {
    (0..num_parties)
        .map(|_| {
            let mut seed = <ChaCha20Rng as SeedableRng>::Seed::default();
            rng.fill_bytes(&mut seed);
            ChaCha20Rng::from_seed(seed)
        })
        .collect()
}

/// Checks that there is at least one secret key share and that every share
/// uses `par`. Returns the number of parties.
fn check_shares(sk_shares: &[SecretKey], par: &Arc<BfvParameters>) -> Result<usize> {
    validate_num_parties(sk_shares.len())?;
    if sk_shares.iter().any(|sk| sk.par != *par) {
        return Err(Error::DefaultError(
            "Incompatible BFV parameters".to_string(),
        ));
    }
    Ok(sk_shares.len())
}

/// Generate the secret key shares of `num_parties` parties and their joint
/// public key.
///
/// The lead samples the common random polynomial; every party then samples
/// its secret key share and publishes its public key share.
#[instrument(skip_all, fields(num_parties = num_parties))]
pub fn joint_key_gen<R: RngCore + CryptoRng>(
    par: &Arc<BfvParameters>,
    num_parties: usize,
    rng: &mut R,
) -> Result<(Vec<SecretKey>, PublicKey)> {
    validate_num_parties(num_parties)?;
    let crp = CommonRandomPoly::new(par, rng)?;

    let parties = fork_rngs(rng, num_parties)
        .into_par_iter()
        .enumerate()
        .map(|(i, mut rng)| {
            trace!(party = i, "public key share");
            let sk_share = SecretKey::random(par, &mut rng)?;
            let pk_share = PublicKeyShare::new(Role::of(i), &sk_share, crp.clone(), &mut rng)?;
            Ok((sk_share, pk_share))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut round = Round::all(num_parties);
    let mut sk_shares = Vec::with_capacity(num_parties);
    for (i, (sk_share, pk_share)) in parties.into_iter().enumerate() {
        round.insert(i, pk_share)?;
        sk_shares.push(sk_share);
    }
    let pk: PublicKey = round.aggregate()?;
    debug!("joint public key generated");
    Ok((sk_shares, pk))
}

/// Generate the joint relinearization key of the parties.
///
/// The first pass folds every secret key share, starting from the lead, into a
/// key switching key from the joint secret to itself. In the second pass every
/// party multiplies it by its secret key share, and the shares are summed.
#[instrument(skip_all, fields(num_parties = sk_shares.len()))]
pub fn joint_relinearization_key_gen<R: RngCore + CryptoRng>(
    sk_shares: &[SecretKey],
    pk: &PublicKey,
    rng: &mut R,
) -> Result<RelinearizationKey> {
    let num_parties = check_shares(sk_shares, &pk.par)?;

    let joint = sk_shares[1..]
        .iter()
        .enumerate()
        .try_fold(
            KeySwitchAccumulator::start(&sk_shares[0], rng)?,
            |acc, (i, sk_share)| {
                trace!(party = i + 1, "key switch accumulation");
                acc.extend_with(sk_share, rng)
            },
        )?
        .finalize(num_parties)?;
    debug!("joint key switching key accumulated");

    let shares = sk_shares
        .par_iter()
        .zip(fork_rngs(rng, num_parties))
        .enumerate()
        .map(|(i, (sk_share, mut rng))| {
            trace!(party = i, "relinearization key share");
            RelinKeyShare::new(sk_share, &joint, &mut rng)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut round = Round::all(num_parties);
    for (i, share) in shares.into_iter().enumerate() {
        round.insert(i, share)?;
    }
    let rk: RelinearizationKey = round.aggregate()?;
    debug!("joint relinearization key generated");
    Ok(rk)
}

/// Generate the joint evaluation key supporting the column rotations by each
/// of `rotations`.
#[instrument(skip_all, fields(num_parties = sk_shares.len()))]
pub fn joint_rotation_key_gen<R: RngCore + CryptoRng>(
    sk_shares: &[SecretKey],
    pk: &PublicKey,
    rotations: &[i32],
    rng: &mut R,
) -> Result<EvaluationKey> {
    let num_parties = check_shares(sk_shares, &pk.par)?;

    let ek = sk_shares[1..]
        .iter()
        .enumerate()
        .try_fold(
            RotationKeyAccumulator::start(&sk_shares[0], rotations, rng)?,
            |acc, (i, sk_share)| {
                trace!(party = i + 1, "rotation key accumulation");
                acc.extend_with(sk_share, rng)
            },
        )?
        .finalize(num_parties)?;
    debug!(?rotations, "joint rotation key generated");
    Ok(ek)
}

/// Decrypt a ciphertext under the joint key.
///
/// Decryption fails silently, returning a wrong plaintext, when the noise of
/// the ciphertext overflows.
#[instrument(skip_all, fields(num_parties = sk_shares.len()))]
pub fn threshold_decrypt<R: RngCore + CryptoRng>(
    sk_shares: &[SecretKey],
    ct: &Ciphertext,
    rng: &mut R,
) -> Result<Plaintext> {
    let num_parties = check_shares(sk_shares, &ct.par)?;
    let ct = Arc::new(ct.clone());

    let shares = sk_shares
        .par_iter()
        .zip(fork_rngs(rng, num_parties))
        .enumerate()
        .map(|(i, (sk_share, mut rng))| {
            trace!(party = i, "decryption share");
            DecryptionShare::new(Role::of(i), sk_share, &ct, &mut rng)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut round = Round::all(num_parties);
    for (i, share) in shares.into_iter().enumerate() {
        round.insert(i, share)?;
    }
    let pt: Plaintext = round.aggregate()?;
    debug!("ciphertext decrypted");
    Ok(pt)
}

/// Convert a ciphertext under the joint key into one message share per party,
/// such that the shares sum to the plaintext modulo t.
///
/// The participants mask their decryption shares with uniform message shares;
/// the lead then decrypts the masked ciphertext into its own message share.
/// The returned shares are ordered by party index.
#[instrument(skip_all, fields(num_parties = sk_shares.len()))]
pub fn encryption_to_shares<R: RngCore + CryptoRng>(
    ct: &Ciphertext,
    sk_shares: &[SecretKey],
    rng: &mut R,
) -> Result<Vec<MessageShare>> {
    let num_parties = check_shares(sk_shares, &ct.par)?;
    let ct = Arc::new(ct.clone());

    let participants = sk_shares[1..]
        .par_iter()
        .zip(fork_rngs(rng, num_parties - 1))
        .enumerate()
        .map(|(i, (sk_share, mut rng))| {
            trace!(party = i + 1, "masked decryption share");
            MessageShare::participant(sk_share, &ct, &mut rng)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut round = Round::participants(num_parties);
    let mut message_shares = Vec::with_capacity(num_parties);
    for (i, (message_share, masked_share)) in participants.into_iter().enumerate() {
        round.insert(i + 1, masked_share)?;
        message_shares.push(message_share);
    }

    let lead = MessageShare::lead(&sk_shares[0], &ct, round.into_shares()?, num_parties, rng)?;
    message_shares.insert(0, lead);
    debug!("ciphertext converted to shares");
    Ok(message_shares)
}

/// Encrypt message shares, ordered by party index, into a fresh ciphertext
/// under the joint key, using `crp` as its second part.
#[instrument(skip_all, fields(num_parties = sk_shares.len()))]
pub fn shares_to_encryption<R: RngCore + CryptoRng>(
    message_shares: &[MessageShare],
    sk_shares: &[SecretKey],
    crp: &CommonRandomPoly,
    rng: &mut R,
) -> Result<Ciphertext> {
    validate_num_parties(sk_shares.len())?;
    let num_parties = check_shares(sk_shares, &sk_shares[0].par)?;
    if crp.poly.ctx() != &sk_shares[0].par.ctx {
        return Err(Error::DefaultError(
            "Incompatible BFV parameters".to_string(),
        ));
    }
    if message_shares.len() != num_parties {
        return Err(Error::PartyCountMismatch {
            expected: num_parties,
            found: message_shares.len(),
        });
    }

    let shares = message_shares
        .par_iter()
        .zip(sk_shares.par_iter())
        .zip(fork_rngs(rng, num_parties))
        .enumerate()
        .map(|(i, ((message_share, sk_share), mut rng))| {
            trace!(party = i, "encryption share");
            EncryptionShare::new(message_share, sk_share, crp, &mut rng)
        })
        .collect::<Result<Vec<_>>>()?;

    let mut round = Round::all(num_parties);
    for (i, share) in shares.into_iter().enumerate() {
        round.insert(i, share)?;
    }
    let ct: Ciphertext = round.aggregate()?;
    debug!("shares converted to a fresh ciphertext");
    Ok(ct)
}

/// Refresh a ciphertext: convert it to message shares and re-encrypt them
/// under a fresh common random polynomial.
///
/// The output encrypts the same plaintext, at depth 0 and with the noise of a
/// fresh encryption.
#[instrument(skip_all, fields(num_parties = sk_shares.len(), depth = ct.depth))]
pub fn multiparty_bootstrap<R: RngCore + CryptoRng>(
    ct: &Ciphertext,
    sk_shares: &[SecretKey],
    rng: &mut R,
) -> Result<Ciphertext> {
    let crp = CommonRandomPoly::new(&ct.par, rng)?;
    let message_shares = encryption_to_shares(ct, sk_shares, rng)?;
    shares_to_encryption(&message_shares, sk_shares, &crp, rng)
}
