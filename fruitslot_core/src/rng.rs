use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

// Provably-fair stream:
// server_seed (secret) + client_seed + nonce -> HMAC-SHA256 -> 32 bytes,
// consumed 4 bytes at a time; an exhausted buffer is replaced by its SHA-256.

pub type HmacSha256 = Hmac<Sha256>;

pub fn derive_hash_hex(input: &[u8]) -> String {
    hex::encode(Sha256::digest(input))
}

#[derive(Debug, Clone)]
pub struct FairRng {
    server_seed: String, // secret until revealed
    client_seed: String,
    nonce: u64,
    buffer: [u8; 32],
    cursor: usize,
}

impl FairRng {
    pub fn new(server_seed: impl Into<String>, client_seed: impl Into<String>, nonce: u64) -> Self {
        let server_seed = server_seed.into();
        let client_seed = client_seed.into();
        let buffer = hmac_bytes(&server_seed, &client_seed, nonce);
        Self {
            server_seed,
            client_seed,
            nonce,
            buffer,
            cursor: 0,
        }
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn client_seed(&self) -> &str {
        &self.client_seed
    }

    /// Commitment published before play; lets the player check the revealed seed.
    pub fn server_seed_hash_hex(&self) -> String {
        derive_hash_hex(self.server_seed.as_bytes())
    }

    fn refill(&mut self) {
        let next = Sha256::digest(self.buffer);
        self.buffer.copy_from_slice(&next);
        self.cursor = 0;
    }
}

fn hmac_bytes(server_seed: &str, client_seed: &str, nonce: u64) -> [u8; 32] {
    let mut mac =
        HmacSha256::new_from_slice(server_seed.as_bytes()).expect("HMAC takes keys of any length");
    mac.update(format!("{client_seed}:{nonce}").as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&mac.finalize().into_bytes());
    out
}

impl RngCore for FairRng {
    fn next_u32(&mut self) -> u32 {
        if self.cursor + 4 > self.buffer.len() {
            self.refill();
        }
        let chunk = &self.buffer[self.cursor..self.cursor + 4];
        self.cursor += 4;
        u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]])
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_u32());
        let lo = u64::from(self.next_u32());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_be_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
