//! Byte-order-mark detection at the head of a stream.
//!
//! The sniffer holds back up to four leading bytes while they could still be
//! a BOM. Once the head is decided it either drops the mark or hands the held
//! bytes back to be tokenized as ordinary data.

const BOMS: [&[u8]; 5] = [
    &[0xEF, 0xBB, 0xBF],       // UTF-8
    &[0xFE, 0xFF],             // UTF-16 BE
    &[0xFF, 0xFE, 0x00, 0x00], // UTF-32 LE
    &[0xFF, 0xFE],             // UTF-16 LE
    &[0x00, 0x00, 0xFE, 0xFF], // UTF-32 BE
];

fn is_bom_prefix(bytes: &[u8]) -> bool {
    BOMS.iter().any(|bom| bom.starts_with(bytes))
}

fn is_bom(bytes: &[u8]) -> bool {
    BOMS.iter().any(|bom| *bom == bytes)
}

/// Length of the longest complete BOM `bytes` starts with, or 0.
fn leading_bom_len(bytes: &[u8]) -> usize {
    BOMS.iter()
        .filter(|bom| bytes.starts_with(bom))
        .map(|bom| bom.len())
        .max()
        .unwrap_or(0)
}

/// `FF FE` stays open because it may continue as the UTF-32 LE mark.
fn is_final_bom(bytes: &[u8]) -> bool {
    is_bom(bytes) && !BOMS.iter().any(|bom| bom.len() > bytes.len() && bom.starts_with(bytes))
}

/// Held-back bytes that turned out to be data.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Replay {
    bytes: [u8; 4],
    len: usize,
}

impl Replay {
    fn from_held(held: &[u8]) -> Self {
        let mut replay = Self::default();
        replay.bytes[..held.len()].copy_from_slice(held);
        replay.len = held.len();
        replay
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..self.len]
    }
}

/// Result of sniffing one chunk.
#[derive(Debug)]
pub(crate) struct Sniffed<'a> {
    /// Bytes of a recognized BOM, which still count towards stream offsets.
    pub skipped: usize,
    /// Held bytes to tokenize before `rest`.
    pub replay: Replay,
    /// The remainder of the chunk.
    pub rest: &'a [u8],
}

#[derive(Debug, Default)]
pub(crate) struct BomSniffer {
    held: [u8; 4],
    len: usize,
    settled: bool,
}

impl BomSniffer {
    pub fn sniff<'a>(&mut self, chunk: &'a [u8]) -> Sniffed<'a> {
        if self.settled {
            return Sniffed {
                skipped: 0,
                replay: Replay::default(),
                rest: chunk,
            };
        }
        for (i, &byte) in chunk.iter().enumerate() {
            let len = self.len;
            self.held[len] = byte;
            let candidate = &self.held[..=len];
            if is_bom_prefix(candidate) {
                self.len += 1;
                if is_final_bom(candidate) {
                    self.settled = true;
                    return Sniffed {
                        skipped: self.len,
                        replay: Replay::default(),
                        rest: &chunk[i + 1..],
                    };
                }
                continue;
            }
            return self.settle(&chunk[i..]);
        }
        Sniffed {
            skipped: 0,
            replay: Replay::default(),
            rest: &[],
        }
    }

    /// Decides whatever is still held when the stream ends.
    pub fn finish(&mut self) -> Sniffed<'static> {
        if self.settled {
            return Sniffed {
                skipped: 0,
                replay: Replay::default(),
                rest: &[],
            };
        }
        self.settle(&[])
    }

    fn settle<'a>(&mut self, rest: &'a [u8]) -> Sniffed<'a> {
        self.settled = true;
        // `FF FE 00` followed by anything but `00` is a UTF-16 LE mark and data.
        let skipped = leading_bom_len(&self.held[..self.len]);
        Sniffed {
            skipped,
            replay: Replay::from_held(&self.held[skipped..self.len]),
            rest,
        }
    }
}
