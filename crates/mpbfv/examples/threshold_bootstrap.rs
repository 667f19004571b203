// Multiparty computation with share-conversion bootstrapping using the `mpbfv`
// crate.
//
// The parties jointly generate their keys, square a ciphertext, refresh it
// with a multiparty bootstrap, multiply it once more and jointly decrypt the
// cube.

mod util;

use std::{env, error::Error, process::exit};

use console::style;
use mpbfv::{
    bfv::{Encoding, Multiplicator, Plaintext},
    mbfv::{self, ProtocolConfig},
};
use mpbfv_traits::{FheDecoder, FheEncoder, FheEncrypter};
use rand::thread_rng;
use tracing_subscriber::EnvFilter;
use util::timeit::timeit;

fn print_notice_and_exit(error: Option<String>) -> ! {
    println!(
        "{} Multiparty squaring, bootstrapping and cubing",
        style("  overview:").magenta().bold()
    );
    println!(
        "{} threshold_bootstrap [-h] [--help] [--num_parties=<value>] [--degree=<value>]",
        style("     usage:").magenta().bold()
    );
    println!(
        "{} {} must be at least 1, and {} a power of two at least 8",
        style("constraints:").magenta().bold(),
        style("num_parties").blue(),
        style("degree").blue(),
    );
    if let Some(error) = error {
        println!("{} {}", style("     error:").red().bold(), error);
    }
    exit(0);
}

fn parse_arg(arg: &str, name: &str) -> usize {
    let parts: Vec<&str> = arg.rsplit('=').collect();
    match parts.first().map(|v| v.parse::<usize>()) {
        Some(Ok(value)) if parts.len() == 2 => value,
        _ => print_notice_and_exit(Some(format!("Invalid `--{name}` argument"))),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.contains(&"-h".to_string()) || args.contains(&"--help".to_string()) {
        print_notice_and_exit(None)
    }

    let mut config = ProtocolConfig::default();
    for arg in &args {
        if arg.starts_with("--num_parties") {
            config.num_parties = parse_arg(arg, "num_parties");
        } else if arg.starts_with("--degree") {
            config.degree = parse_arg(arg, "degree");
        } else {
            print_notice_and_exit(Some(format!("Unrecognized argument: {arg}")))
        }
    }
    if config.num_parties == 0 {
        print_notice_and_exit(Some("Party count must be nonzero".to_string()))
    }

    println!("# Multiparty bootstrapping");
    println!("\tnum_parties = {}", config.num_parties);
    println!("\tdegree = {}", config.degree);
    println!("\tplaintext_modulus = {}", config.plaintext_modulus);

    let mut rng = thread_rng();
    let par = timeit!("Parameters generation", config.build_parameters()?);

    let (sk_shares, pk) = timeit!(
        "Joint key generation",
        mbfv::joint_key_gen(&par, config.num_parties, &mut rng)?
    );
    let rk = timeit!(
        "Joint relinearization key generation",
        mbfv::joint_relinearization_key_gen(&sk_shares, &pk, &mut rng)?
    );
    let mul = Multiplicator::default(&rk)?;

    let v: &[u64] = &[1, 2, 3, 4, 5];
    let ct = timeit!("Encryption", {
        let pt = Plaintext::try_encode(v, Encoding::simd(), &par)?;
        pk.try_encrypt(&pt, &mut rng)?
    });

    let square = timeit!("Squaring", mul.multiply(&ct, &ct)?);
    println!("\tdepth after squaring = {}", square.depth());

    let refreshed = timeit!(
        "Multiparty bootstrap",
        mbfv::multiparty_bootstrap(&square, &sk_shares, &mut rng)?
    );
    println!("\tdepth after bootstrapping = {}", refreshed.depth());

    let cube = timeit!("Cubing", mul.multiply(&refreshed, &ct)?);

    let result = timeit!("Threshold decryption", {
        let pt = mbfv::threshold_decrypt(&sk_shares, &cube, &mut rng)?;
        let mut w = Vec::<u64>::try_decode(&pt, Encoding::simd())?;
        w.truncate(v.len());
        w
    });

    let expected = v.iter().map(|vi| vi * vi * vi).collect::<Vec<_>>();
    println!("\tinput  = {v:?}");
    println!("\tcubed  = {result:?}");
    if result != expected {
        println!("{} expected {expected:?}", style("  mismatch:").red().bold());
        exit(1);
    }
    Ok(())
}
