use base64::{engine::general_purpose::STANDARD as B64, Engine as _};

// Decode routines emitted verbatim into the generated artifact. Their
// lengths are the fixed overheads of the encoding size model, so any edit
// here shifts the hex/base64 selection boundary.
const HEX_DECODER: &str = r#"const high_map: { [key: string]: number } = {
  0: 0x00, 1: 0x10, 2: 0x20, 3: 0x30,
  4: 0x40, 5: 0x50, 6: 0x60, 7: 0x70,
  8: 0x80, 9: 0x90, a: 0xa0, b: 0xb0,
  c: 0xc0, d: 0xd0, e: 0xe0, f: 0xf0,
  A: 0xa0, B: 0xb0, C: 0xc0, D: 0xd0,
  E: 0xe0, F: 0xf0,
};

const low_map: { [key: string]: number } = {
  0: 0x00, 1: 0x01, 2: 0x02, 3: 0x03,
  4: 0x04, 5: 0x05, 6: 0x06, 7: 0x07,
  8: 0x08, 9: 0x09, a: 0x0a, b: 0x0b,
  c: 0x0c, d: 0x0d, e: 0x0e, f: 0x0f,
  A: 0x0a, B: 0x0b, C: 0x0c, D: 0x0d,
  E: 0x0e, F: 0x0f,
};

const bytes = new Uint8Array(hex.length / 2);
for (let i = 0, j = 0; j < hex.length; i++, j += 2) {
  bytes[i] = high_map[hex[j]] | low_map[hex[j + 1]];
}

const modp = WebAssembly.compile(bytes);"#;

// 64 marks '=': the group stops emitting at the first padding position.
const BASE64_DECODER: &str = r#"const b64_map: { [key: string]: number } = {
  A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7,
  I: 8, J: 9, K: 10, L: 11, M: 12, N: 13, O: 14, P: 15,
  Q: 16, R: 17, S: 18, T: 19, U: 20, V: 21, W: 22, X: 23,
  Y: 24, Z: 25, a: 26, b: 27, c: 28, d: 29, e: 30, f: 31,
  g: 32, h: 33, i: 34, j: 35, k: 36, l: 37, m: 38, n: 39,
  o: 40, p: 41, q: 42, r: 43, s: 44, t: 45, u: 46, v: 47,
  w: 48, x: 49, y: 50, z: 51, 0: 52, 1: 53, 2: 54, 3: 55,
  4: 56, 5: 57, 6: 58, 7: 59, 8: 60, 9: 61, "+": 62, "/": 63,
  "=": 64,
};

const bytes = new Uint8Array((b64.length / 4) * 3);
let n = 0;
for (let i = 0; i < b64.length; i += 4) {
  const c0 = b64_map[b64[i]];
  const c1 = b64_map[b64[i + 1]];
  const c2 = b64_map[b64[i + 2]];
  const c3 = b64_map[b64[i + 3]];
  bytes[n++] = (c0 << 2) | (c1 >> 4);
  if (c2 === 64) continue;
  bytes[n++] = ((c1 & 0x0f) << 4) | (c2 >> 2);
  if (c3 === 64) continue;
  bytes[n++] = ((c2 & 0x03) << 6) | c3;
}

const modp = WebAssembly.compile(bytes.subarray(0, n));"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Base64,
}

impl Encoding {
    // estimated emitted size = encoded length + matching decode routine;
    // base64 must win strictly, so hex keeps ties and small payloads
    fn select(payload_len: usize) -> Self {
        let hex_estimate = 2 * payload_len + HEX_DECODER.len();
        let base64_estimate = (4 * payload_len).div_ceil(3) + BASE64_DECODER.len();

        match base64_estimate < hex_estimate {
            true => Encoding::Base64,
            false => Encoding::Hex,
        }
    }
}

/// The compiled binary as embeddable source text: an encoded string literal
/// plus the decode routine that rebuilds the exact bytes behind `modp`.
#[derive(Debug, PartialEq, Eq)]
pub struct EmbeddedPayload {
    encoding: Encoding,
    encoded: String,
}

impl EmbeddedPayload {
    pub fn new(bin: &[u8]) -> Self {
        let encoding = Encoding::select(bin.len());
        let encoded = match encoding {
            Encoding::Hex => bin.iter().map(|byte| format!("{byte:02x}")).collect(),
            Encoding::Base64 => B64.encode(bin),
        };

        Self { encoding, encoded }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn render(&self) -> String {
        match self.encoding {
            Encoding::Hex => format!("const hex = \"{}\";\n\n{HEX_DECODER}", self.encoded),
            Encoding::Base64 => format!("const b64 = \"{}\";\n\n{BASE64_DECODER}", self.encoded),
        }
    }
}
