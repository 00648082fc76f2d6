// Numeric literal readers
//
// Each reader starts at `*pos`, accumulates digits until a stop character, a non digit
// or the end of the input, and leaves `*pos` on the first unconsumed byte. An empty
// digit run reads as 0. '_' is accepted as a digit separator.

fn read_digits(pos: &mut usize, input: &str, stop: &str, radix: u32) -> u64 {
    let bytes = input.as_bytes();
    let mut value: u64 = 0;

    while let Some(&b) = bytes.get(*pos) {
        let c = b as char;
        if stop.contains(c) {
            break;
        }
        if c == '_' {
            *pos += 1;
            continue;
        }
        match c.to_digit(radix) {
            Some(d) => {
                value = value.wrapping_mul(radix as u64).wrapping_add(d as u64);
                *pos += 1;
            },
            None => break,
        }
    }
    value
}

pub fn read_bin(pos: &mut usize, input: &str, stop: &str) -> u64 {
    read_digits(pos, input, stop, 2)
}

pub fn read_qua(pos: &mut usize, input: &str, stop: &str) -> u64 {
    read_digits(pos, input, stop, 4)
}

pub fn read_oct(pos: &mut usize, input: &str, stop: &str) -> u64 {
    read_digits(pos, input, stop, 8)
}

pub fn read_dec(pos: &mut usize, input: &str, stop: &str) -> u64 {
    read_digits(pos, input, stop, 10)
}

pub fn read_hex(pos: &mut usize, input: &str, stop: &str) -> u64 {
    read_digits(pos, input, stop, 16)
}

// Quoted byte string, `*pos` is on the opening quote
//
// A backslash takes the next byte literally. An unterminated string runs to the end
// of the input.
pub fn read_str_bytes(pos: &mut usize, input: &str) -> Vec<u8> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();

    if bytes.get(*pos) == Some(&b'"') {
        *pos += 1;
    }
    while let Some(&b) = bytes.get(*pos) {
        *pos += 1;
        match b {
            b'"' => break,
            b'\\' => match bytes.get(*pos) {
                Some(&e) => {
                    *pos += 1;
                    out.push(e);
                },
                None => break,
            },
            _ => out.push(b),
        }
    }
    out
}

// Each byte shifts the value up by 256, so "AB" reads as $4142
pub fn read_str(pos: &mut usize, input: &str) -> u64 {
    read_str_bytes(pos, input)
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_shl(8) | b as u64)
}
