use std::error::Error;

use mpbfv::bfv::{BfvParameters, Ciphertext, Encoding, Multiplicator, Plaintext, SecretKey};
use mpbfv::mbfv::{
    encryption_to_shares, joint_key_gen, joint_relinearization_key_gen, joint_rotation_key_gen,
    multiparty_bootstrap, shares_to_encryption, threshold_decrypt, CommonRandomPoly,
    DecryptionShare, ProtocolConfig, Role, Round,
};
use mpbfv_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
use rand::{rngs::OsRng, thread_rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

const NUM_PARTIES: usize = 5;

fn parameters() -> Result<Arc<BfvParameters>, Box<dyn Error>> {
    Ok(ProtocolConfig::default().build_parameters()?)
}

fn joint_secret(sk_shares: &[SecretKey], par: &Arc<BfvParameters>) -> SecretKey {
    let mut s = vec![0i64; par.degree()];
    for sk in sk_shares {
        s.iter_mut().zip(sk.coeffs.iter()).for_each(|(a, b)| *a += b);
    }
    SecretKey::new(s, par)
}

fn decrypt(
    sk_shares: &[SecretKey],
    ct: &Ciphertext,
    len: usize,
) -> Result<Vec<u64>, Box<dyn Error>> {
    let pt = threshold_decrypt(sk_shares, ct, &mut thread_rng())?;
    let mut w = Vec::<u64>::try_decode(&pt, Encoding::simd())?;
    w.truncate(len);
    Ok(w)
}

#[test]
fn scenario() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let mut rng = thread_rng();
    let par = parameters()?;
    let (sk_shares, pk) = joint_key_gen(&par, NUM_PARTIES, &mut rng)?;
    let rk = joint_relinearization_key_gen(&sk_shares, &pk, &mut rng)?;
    let rotations = [-2, -1, 1, 2];
    let ek = joint_rotation_key_gen(&sk_shares, &pk, &rotations, &mut rng)?;
    let mul = Multiplicator::default(&rk)?;

    let v: &[u64] = &[1, 2, 3, 4, 5];
    let pt = Plaintext::try_encode(v, Encoding::simd(), &par)?;
    let ct = pk.try_encrypt(&pt, &mut rng)?;
    assert_eq!(decrypt(&sk_shares, &ct, 5)?, v);

    let sum = &ct + &ct;
    assert_eq!(decrypt(&sk_shares, &sum, 5)?, [2, 4, 6, 8, 10]);

    let square = mul.multiply(&ct, &ct)?;
    assert_eq!(square.depth(), 1);
    assert_eq!(decrypt(&sk_shares, &square, 5)?, [1, 4, 9, 16, 25]);

    let cube = mul.multiply(&square, &ct)?;
    assert_eq!(cube.depth(), 2);
    assert_eq!(decrypt(&sk_shares, &cube, 5)?, [1, 8, 27, 64, 125]);

    // Rotations move the slots of each row to the left.
    let row_size = par.degree() / 2;
    let mut row = v.to_vec();
    row.resize(row_size, 0);
    for r in rotations {
        let rotated = ek.rotates_columns_by(&ct, r)?;
        let mut expected = row.clone();
        expected.rotate_left(r.rem_euclid(row_size as i32) as usize);
        assert_eq!(decrypt(&sk_shares, &rotated, row_size)?, expected);
    }
    let w = decrypt(&sk_shares, &ek.rotates_columns_by(&ct, 2)?, row_size)?;
    assert_eq!(w[..3], [3, 4, 5]);
    assert_eq!(w[row_size - 2..], [1, 2]);

    // Bootstrapping resets the depth and the noise.
    let sk = joint_secret(&sk_shares, &par);
    let refreshed = multiparty_bootstrap(&cube, &sk_shares, &mut rng)?;
    assert_eq!(refreshed.depth(), 0);
    assert_eq!(decrypt(&sk_shares, &refreshed, 5)?, [1, 8, 27, 64, 125]);
    assert!(sk.measure_noise(&refreshed)? < sk.measure_noise(&cube)?);

    let refreshed_square = multiparty_bootstrap(&square, &sk_shares, &mut rng)?;
    let cube = mul.multiply(&refreshed_square, &ct)?;
    assert_eq!(cube.depth(), 1);
    assert_eq!(decrypt(&sk_shares, &cube, 5)?, [1, 8, 27, 64, 125]);
    Ok(())
}

#[test]
fn message_shares_sum_to_plaintext() -> Result<(), Box<dyn Error>> {
    let mut rng = thread_rng();
    let par = parameters()?;
    let (sk_shares, pk) = joint_key_gen(&par, NUM_PARTIES, &mut rng)?;

    let v = (0..par.degree() as u64).collect::<Vec<_>>();
    let pt = Plaintext::try_encode(&v, Encoding::poly(), &par)?;
    let ct = pk.try_encrypt(&pt, &mut rng)?;

    let shares = encryption_to_shares(&ct, &sk_shares, &mut rng)?;
    assert_eq!(shares.len(), NUM_PARTIES);
    let mut sum = vec![0u64; par.degree()];
    for share in &shares {
        sum.iter_mut()
            .zip(share.values())
            .for_each(|(a, b)| *a = (*a + b) % par.plaintext());
    }
    assert_eq!(sum, v);

    let crp = CommonRandomPoly::new(&par, &mut rng)?;
    let fresh = shares_to_encryption(&shares, &sk_shares, &crp, &mut rng)?;
    assert_eq!(
        threshold_decrypt(&sk_shares, &fresh, &mut rng)?,
        threshold_decrypt(&sk_shares, &ct, &mut rng)?
    );
    Ok(())
}

#[test]
fn single_party_matches_secret_key() -> Result<(), Box<dyn Error>> {
    let mut rng = thread_rng();
    let par = parameters()?;
    let (sk_shares, pk) = joint_key_gen(&par, 1, &mut rng)?;
    let v = par.degree() as u64;
    let pt = Plaintext::try_encode(&[v, 1, 2][..], Encoding::poly(), &par)?;
    let ct = pk.try_encrypt(&pt, &mut rng)?;
    assert_eq!(
        threshold_decrypt(&sk_shares, &ct, &mut rng)?,
        sk_shares[0].try_decrypt(&ct)?
    );
    Ok(())
}

#[test]
fn seeded_sessions_are_reproducible() -> Result<(), Box<dyn Error>> {
    let par = parameters()?;
    let (_, pk1) = joint_key_gen(&par, 3, &mut ChaCha8Rng::seed_from_u64(42))?;
    let (_, pk2) = joint_key_gen(&par, 3, &mut ChaCha8Rng::seed_from_u64(42))?;
    let (_, pk3) = joint_key_gen(&par, 3, &mut OsRng)?;
    assert_eq!(pk1, pk2);
    assert_ne!(pk1, pk3);
    Ok(())
}

#[test]
fn errors() -> Result<(), Box<dyn Error>> {
    let mut rng = thread_rng();
    let par = parameters()?;
    assert_eq!(
        joint_key_gen(&par, 0, &mut rng).err(),
        Some(mpbfv::Error::TooFewValues(0, 1))
    );

    let (sk_shares, pk) = joint_key_gen(&par, 3, &mut rng)?;
    let ct = pk.try_encrypt(&Plaintext::zero(Encoding::simd(), &par)?, &mut rng)?;

    let ek = joint_rotation_key_gen(&sk_shares, &pk, &[1], &mut rng)?;
    assert_eq!(
        ek.rotates_columns_by(&ct, 3).err(),
        Some(mpbfv::Error::MissingRotationKey(3))
    );

    let shares = encryption_to_shares(&ct, &sk_shares, &mut rng)?;
    let crp = CommonRandomPoly::new(&par, &mut rng)?;
    assert_eq!(
        shares_to_encryption(&shares[1..], &sk_shares, &crp, &mut rng).err(),
        Some(mpbfv::Error::PartyCountMismatch {
            expected: 3,
            found: 2
        })
    );
    assert_eq!(
        threshold_decrypt(&[], &ct, &mut rng).err(),
        Some(mpbfv::Error::TooFewValues(0, 1))
    );

    // A round refuses duplicates and cannot be aggregated before every party
    // contributed.
    let ct = Arc::new(ct);
    let mut round = Round::all(3);
    round.insert(0, DecryptionShare::new(Role::Lead, &sk_shares[0], &ct, &mut rng)?)?;
    let share = DecryptionShare::new(Role::Participant, &sk_shares[1], &ct, &mut rng)?;
    round.insert(1, share.clone())?;
    assert_eq!(
        round.insert(1, share),
        Err(mpbfv::Error::DuplicateContribution(1))
    );
    assert_eq!(
        round.aggregate::<Plaintext>().err(),
        Some(mpbfv::Error::IncompleteRound {
            expected: 3,
            found: 2
        })
    );
    Ok(())
}
