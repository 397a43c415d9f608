use fixq_math::{Fp, Result};

// Runs a fixed sequence of conversions and arithmetic and prints a digest of
// every raw word produced. Two machines agree iff the digests match.

fn main() -> Result<()> {
    let operands: Vec<Fp> = [
        "0", "1", "-1", "0.5", "-0.5", "0.25", "-0.25", "1.25", "-1.25", "127", "-128",
        "0.00006103515625", "-3.14159",
    ]
    .iter()
    .map(|s| s.parse())
    .collect::<Result<_>>()?;

    let mut words = Vec::new();
    for &x in &operands {
        words.push(x.raw());
        words.push(x.to_int());
        words.push(x.to_int_round());
        for &y in &operands {
            words.push(x.saturating_mul(y).raw());
            if y != Fp::ZERO {
                words.push(x.saturating_div(y)?.raw());
            }
        }
    }

    let mut bytes = Vec::with_capacity(words.len() * 4);
    for w in &words {
        bytes.extend_from_slice(&w.to_le_bytes());
    }
    println!("Q14_HASH {} ({} words)", sha256(&bytes), words.len());
    Ok(())
}

fn sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    let out = hasher.finalize();
    hex::encode(out)
}
