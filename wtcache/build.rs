use std::env;
use std::fs;
use std::path::Path;

const TABLE_SIZE: usize = u8::MAX as usize + 1;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    // Generating the pair table in a const fn hits the const eval limit, so it's written out here
    let out_dir = env::var_os("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let path = Path::new(&out_dir).join("hex.rs");
    let table = format!("{:?}", hex_pair_table());
    fs::write(
        &path,
        format!("/// Byte value of every pair of hex digits, indexed by the two ASCII characters\npub const HEX_LOOKUP: [[u8; {TABLE_SIZE}]; {TABLE_SIZE}] = {table};\n"),
    )
    .expect("couldn't write the hex lookup table");
}

fn hex_pair_table() -> Vec<[u8; TABLE_SIZE]> {
    (0..TABLE_SIZE)
        .map(|high| {
            let mut row = [0u8; TABLE_SIZE];
            for (low, value) in row.iter_mut().enumerate() {
                *value = nibble(high as u8) << 4 | nibble(low as u8);
            }
            row
        })
        .collect()
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}
