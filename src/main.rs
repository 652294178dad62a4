//! Evaluation bin: scheme demos, then a selectivity sweep comparing
//! sequential-sum cost and ciphertext growth across schemes.

use std::error::Error;
use std::fs::File;
use std::time::{Duration, Instant};

use csv::Writer;
use rand::{thread_rng, Rng};
use symphe::baseline::{AdditiveBaseline, BaselineScheme, Paillier};
use symphe::{LedgerKind, SecretKey, Strawman, SymAhe, SymMhe};

const ITERATIONS: usize = 10_000;

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn demos(rng: &mut impl Rng) -> Result<(), Box<dyn Error>> {
    let mut ahe = SymAhe::new(SecretKey::generate(rng));
    let five = ahe.encrypt(5)?;
    let ten = ahe.encrypt(10)?;
    let sum = ahe.add(five, ten)?;
    println!("SymAhe  5 + 10       -> {}", ahe.decrypt(&sum));

    let neg = ahe.encrypt(-3)?;
    println!("SymAhe  -3 roundtrip -> {}", ahe.decrypt(&neg));

    let mut mhe = SymMhe::new(SecretKey::generate(rng));
    let six = mhe.encrypt(6)?;
    let three = mhe.encrypt(3)?;
    let quotient = mhe.divide(six, three)?;
    println!("SymMhe  6 / 3        -> {}", mhe.decrypt(&quotient)?);
    Ok(())
}

/// Fold `ITERATIONS` random values at each selectivity level, timing only the
/// homomorphic additions. The symmetric engines encrypt every value whether or
/// not it is selected, so skipped values leave id gaps in the ledgers.
fn time_sums(
    paillier: &Paillier,
    wtr: &mut Writer<File>,
    rng: &mut impl Rng,
) -> Result<(), Box<dyn Error>> {
    println!("\nsum sweep: {} values per selectivity level", ITERATIONS);

    // selectivity 1 is a warmup row
    let mut selectivity = 1u32;
    while selectivity <= 100 {
        let mut range = SymAhe::with_options(SecretKey::generate(rng), LedgerKind::Range, 2);
        let mut array = SymAhe::with_options(SecretKey::generate(rng), LedgerKind::Array, 2);
        let straw = Strawman::new(SecretKey::generate(rng));

        let mut count = 0u64;
        let mut plain = 0i64;
        let mut plain_paillier = 0i64;

        let mut sum_range = range.encrypt(0)?;
        let mut sum_array = array.encrypt(0)?;
        let mut sum_straw = straw.encrypt(0, rng)?;
        let mut sum_paillier = paillier.encrypt(0, rng)?;
        // Paillier encryption dominates everything else, so the addend is
        // encrypted once and reused
        let addend = 100i64;
        let c_paillier = paillier.encrypt(addend, rng)?;

        let mut t_range = Duration::ZERO;
        let mut t_array = Duration::ZERO;
        let mut t_straw = Duration::ZERO;
        let mut t_paillier = Duration::ZERO;

        for _ in 0..ITERATIONS {
            let m = rng.gen_range(0..1_000i64);
            let c_range = range.encrypt(m)?;
            let c_array = array.encrypt(m)?;

            if rng.gen_range(0..100) < selectivity {
                count += 1;
                plain += m;
                plain_paillier += addend;
                let c_straw = straw.encrypt(m, rng)?;

                let t = Instant::now();
                sum_range = range.add(sum_range, c_range)?;
                t_range += t.elapsed();

                let t = Instant::now();
                sum_array = array.add(sum_array, c_array)?;
                t_array += t.elapsed();

                let t = Instant::now();
                sum_straw = straw.add(sum_straw, c_straw);
                t_straw += t.elapsed();

                let t = Instant::now();
                sum_paillier = paillier.add(sum_paillier, &c_paillier);
                t_paillier += t.elapsed();
            }
        }

        assert_eq!(range.decrypt(&sum_range), plain);
        assert_eq!(array.decrypt(&sum_array), plain);
        assert_eq!(straw.decrypt(&sum_straw)?, plain);
        assert_eq!(paillier.decrypt(&sum_paillier)?, plain_paillier);

        println!(
            "selectivity {:>3}: {:>5} adds | range {:>8} B | array {:>8} B | strawman {:>8} B | paillier {:>5} B",
            selectivity,
            count,
            sum_range.byte_size(),
            sum_array.byte_size(),
            sum_straw.byte_size(),
            sum_paillier.byte_size(),
        );
        wtr.write_record(&[
            selectivity.to_string(),
            count.to_string(),
            format!("{:.3}", ms(t_range)),
            format!("{:.3}", ms(t_array)),
            format!("{:.3}", ms(t_straw)),
            format!("{:.3}", ms(t_paillier)),
            sum_range.byte_size().to_string(),
            sum_array.byte_size().to_string(),
            sum_straw.byte_size().to_string(),
            sum_paillier.byte_size().to_string(),
        ])?;

        if selectivity == 1 {
            selectivity = 10;
        } else {
            selectivity += 10;
        }
    }
    Ok(())
}

/// Multiplicative fold: mostly ones with a doubling every 500 values, keeping
/// the running product inside the signed range.
fn time_products(rng: &mut impl Rng) -> Result<(), Box<dyn Error>> {
    let mut mhe = SymMhe::new(SecretKey::generate(rng));
    let mut product = mhe.encrypt(1)?;
    let mut plain = 1i64;

    let start = Instant::now();
    for i in 1..=ITERATIONS {
        let m = if i % 500 == 0 { 2 } else { 1 };
        let c = mhe.encrypt(m)?;
        product = mhe.multiply(product, c)?;
        plain *= m;
    }
    let elapsed = start.elapsed();

    assert_eq!(mhe.decrypt(&product)?, plain);
    println!(
        "\nSymMhe fold: {} multiplies in {:.3} ms, product {}, ciphertext {} bytes",
        ITERATIONS,
        ms(elapsed),
        plain,
        product.byte_size(),
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut wtr = Writer::from_path("phe_stats.csv")?;
    wtr.write_record(&[
        "selectivity",
        "count",
        "ahe_range_ms",
        "ahe_array_ms",
        "strawman_ms",
        "paillier_ms",
        "ahe_range_bytes",
        "ahe_array_bytes",
        "strawman_bytes",
        "paillier_bytes",
    ])?;

    let mut rng = thread_rng();
    demos(&mut rng)?;

    println!("\ngenerating Paillier keys");
    let start = Instant::now();
    let paillier = Paillier::generate(&mut rng);
    println!("key generation took {:.3} ms", ms(start.elapsed()));

    time_sums(&paillier, &mut wtr, &mut rng)?;
    time_products(&mut rng)?;

    wtr.flush()?;
    Ok(())
}
