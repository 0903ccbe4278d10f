//! GF(2^8) arithmetic with log/exp tables.
//!
//! Elements are plain `u8`. The field is generated by the primitive element
//! `2` modulo the polynomial x^8 + x^4 + x^3 + x^2 + 1 (`0x11D`). Tables are
//! built once per process on first use and shared read-only afterwards.

use std::sync::OnceLock;

use crate::error::{CodecError, Result};

/// x^8 + x^4 + x^3 + x^2 + 1
pub const GENERATING_POLYNOMIAL: u16 = 0x11D;

/// Order of the multiplicative group.
const GROUP_ORDER: usize = 255;

struct Tables {
    log: [u8; 256],
    exp: [u8; 256],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let mut log = [0u8; 256];
        let mut exp = [0u8; 256];
        let mut x: u16 = 1;
        for i in 0..GROUP_ORDER {
            exp[i] = x as u8;
            log[x as usize] = i as u8;
            x <<= 1;
            if x & 0x100 != 0 {
                x ^= GENERATING_POLYNOMIAL;
            }
        }
        exp[GROUP_ORDER] = exp[0];
        Tables { log, exp }
    })
}

#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Same as [`add`]: the field has characteristic 2.
#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    let l = t.log[a as usize] as usize + t.log[b as usize] as usize;
    t.exp[l % GROUP_ORDER]
}

pub fn div(a: u8, b: u8) -> Result<u8> {
    if b == 0 {
        return Err(CodecError::DivisionByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    let t = tables();
    let l = t.log[a as usize] as usize + GROUP_ORDER - t.log[b as usize] as usize;
    Ok(t.exp[l % GROUP_ORDER])
}

pub fn inv(a: u8) -> Result<u8> {
    div(1, a)
}

/// `a` raised to `n`. `pow(0, 0)` is 1, which gives the Vandermonde row for
/// generator 0 its leading one.
pub fn pow(a: u8, n: usize) -> u8 {
    if n == 0 {
        return 1;
    }
    if a == 0 {
        return 0;
    }
    let t = tables();
    let l = (t.log[a as usize] as usize * n) % GROUP_ORDER;
    t.exp[l]
}

/// `dst[i] ^= coef * src[i]` over the common prefix of both slices.
pub fn mul_add_slice(coef: u8, src: &[u8], dst: &mut [u8]) {
    match coef {
        0 => {}
        1 => {
            for (d, s) in dst.iter_mut().zip(src) {
                *d ^= *s;
            }
        }
        _ => {
            let t = tables();
            let lc = t.log[coef as usize] as usize;
            for (d, &s) in dst.iter_mut().zip(src) {
                if s != 0 {
                    *d ^= t.exp[(lc + t.log[s as usize] as usize) % GROUP_ORDER];
                }
            }
        }
    }
}
