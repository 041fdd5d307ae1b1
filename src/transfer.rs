//! System Program transfer construction in Solana wire format.
//!
//! The message layout is the compact binary format the node expects:
//!
//! ```text
//! message:
//!   num_required_sigs     u8
//!   num_readonly_signed   u8
//!   num_readonly_unsigned u8
//!   num_accounts          compact-u16
//!   account_keys          32 bytes * num_accounts
//!   recent_blockhash      32 bytes
//!   num_instructions      compact-u16
//!   instructions[]        program index, account indices, data
//! ```
//!
//! Only the single-signer transfer shape the wallet needs is supported; the
//! provider signs the message bytes and the signed wire goes out via
//! `sendTransaction`.

use crate::errors::{WalletError, WalletResult};

/// The Solana System Program public key: 32 zero bytes.
pub const SYSTEM_PROGRAM_ID: [u8; 32] = [0u8; 32];

/// System Program `Transfer` instruction index (little-endian u32).
const TRANSFER_INSTRUCTION_INDEX: u32 = 2;

/// Encode a `u16` value in Solana's compact-u16 format.
pub fn encode_compact_u16(value: u16) -> Vec<u8> {
    let mut remaining = value as u32;
    let mut out = Vec::with_capacity(3);

    loop {
        let mut byte = (remaining & 0x7f) as u8;
        remaining >>= 7;
        if remaining > 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if remaining == 0 {
            break;
        }
    }

    out
}

/// Decode a Base58 address into its 32-byte public key.
pub fn decode_address(address: &str) -> WalletResult<[u8; 32]> {
    decode_32(address).map_err(WalletError::InvalidAddress)
}

/// Encode a 32-byte public key as a Base58 address.
pub fn encode_address(bytes: &[u8; 32]) -> String {
    bs58::encode(bytes).into_string()
}

/// Decode a Base58 blockhash into 32 bytes.
pub fn decode_blockhash(blockhash: &str) -> WalletResult<[u8; 32]> {
    decode_32(blockhash).map_err(WalletError::TransactionBuild)
}

fn decode_32(value: &str) -> Result<[u8; 32], String> {
    let bytes = bs58::decode(value)
        .into_vec()
        .map_err(|e| format!("Base58 decode failed: {}", e))?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| format!("Expected 32 bytes, got {}", v.len()))
}

/// A lamport transfer ready for signing: the fee payer is the sender and the
/// only required signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    from: [u8; 32],
    to: [u8; 32],
    pub lamports: u64,
    recent_blockhash: [u8; 32],
    pub last_valid_block_height: u64,
}

impl TransferPlan {
    pub fn new(
        from: &str,
        to: &str,
        lamports: u64,
        blockhash: &str,
        last_valid_block_height: u64,
    ) -> WalletResult<Self> {
        if lamports == 0 {
            return Err(WalletError::InvalidAmount(
                "Transfer of zero lamports".to_string(),
            ));
        }

        Ok(Self {
            from: decode_address(from)?,
            to: decode_address(to)?,
            lamports,
            recent_blockhash: decode_blockhash(blockhash)?,
            last_valid_block_height,
        })
    }

    /// A transfer from an address back to itself.
    pub fn self_transfer(
        address: &str,
        lamports: u64,
        blockhash: &str,
        last_valid_block_height: u64,
    ) -> WalletResult<Self> {
        Self::new(address, address, lamports, blockhash, last_valid_block_height)
    }

    /// The account that signs and pays fees.
    pub fn fee_payer(&self) -> &[u8; 32] {
        &self.from
    }

    /// Serialize the message: these are the bytes the provider signs.
    pub fn message_bytes(&self) -> Vec<u8> {
        let self_transfer = self.from == self.to;

        // Account keys in canonical order: writable signer, then writable
        // non-signers, then the read-only program. A self-transfer reuses
        // the fee payer slot for both sides of the instruction.
        let mut keys: Vec<&[u8; 32]> = Vec::with_capacity(3);
        keys.push(&self.from);
        if !self_transfer {
            keys.push(&self.to);
        }
        keys.push(&SYSTEM_PROGRAM_ID);

        let program_index = (keys.len() - 1) as u8;
        let to_index = if self_transfer { 0u8 } else { 1u8 };

        let mut data = Vec::with_capacity(12);
        data.extend_from_slice(&TRANSFER_INSTRUCTION_INDEX.to_le_bytes());
        data.extend_from_slice(&self.lamports.to_le_bytes());

        let mut buf = Vec::with_capacity(3 + 1 + keys.len() * 32 + 32 + 32);
        buf.push(1); // required signatures: the fee payer
        buf.push(0); // read-only signers
        buf.push(1); // read-only non-signers: the program id
        buf.extend_from_slice(&encode_compact_u16(keys.len() as u16));
        for key in keys {
            buf.extend_from_slice(key);
        }
        buf.extend_from_slice(&self.recent_blockhash);
        buf.extend_from_slice(&encode_compact_u16(1));
        buf.push(program_index);
        buf.extend_from_slice(&encode_compact_u16(2));
        buf.push(0);
        buf.push(to_index);
        buf.extend_from_slice(&encode_compact_u16(data.len() as u16));
        buf.extend_from_slice(&data);
        buf
    }
}

/// Assemble the signed wire format: signature count, signature, message.
pub fn assemble_wire(message: &[u8], signature: &[u8; 64]) -> Vec<u8> {
    let mut wire = Vec::with_capacity(1 + 64 + message.len());
    wire.extend_from_slice(&encode_compact_u16(1));
    wire.extend_from_slice(signature);
    wire.extend_from_slice(message);
    wire
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYER: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
    const OTHER: &str = "MemoSq4gqABAXKb96qnH8TysNcWxMyWCqXgDLGmfcHr";
    const BLOCKHASH: &str = "EkSnNWid2cvwEVnVx9aBqawnmiCNiDgp3gUdkDPTKN1N";

    #[test]
    fn compact_u16_byte_boundaries() {
        assert_eq!(encode_compact_u16(0), vec![0x00]);
        assert_eq!(encode_compact_u16(0x7f), vec![0x7f]);
        assert_eq!(encode_compact_u16(0x80), vec![0x80, 0x01]);
        assert_eq!(encode_compact_u16(0x3fff), vec![0xff, 0x7f]);
        assert_eq!(encode_compact_u16(0x4000), vec![0x80, 0x80, 0x01]);
        assert_eq!(encode_compact_u16(u16::MAX), vec![0xff, 0xff, 0x03]);
    }

    #[test]
    fn address_codec_round_trips() {
        let bytes = decode_address(PAYER).unwrap();
        assert_eq!(encode_address(&bytes), PAYER);
        assert!(decode_address("1").is_err());
        assert!(decode_address("###").is_err());
    }

    #[test]
    fn self_transfer_dedupes_account_keys() {
        let plan = TransferPlan::self_transfer(PAYER, 10_000_000, BLOCKHASH, 3090).unwrap();
        let message = plan.message_bytes();

        // Header
        assert_eq!(&message[..3], &[1, 0, 1]);
        // Two account keys: payer and the System Program
        assert_eq!(message[3], 2);
        assert_eq!(&message[4..36], &decode_address(PAYER).unwrap());
        assert_eq!(&message[36..68], &SYSTEM_PROGRAM_ID);
        // Blockhash
        assert_eq!(&message[68..100], &decode_blockhash(BLOCKHASH).unwrap());
        // One instruction against program index 1, accounts [0, 0]
        assert_eq!(&message[100..105], &[1, 1, 2, 0, 0]);
        // 12 data bytes: u32 transfer index 2, then lamports LE
        assert_eq!(message[105], 12);
        assert_eq!(&message[106..110], &2u32.to_le_bytes());
        assert_eq!(&message[110..118], &10_000_000u64.to_le_bytes());
        assert_eq!(message.len(), 118);
    }

    #[test]
    fn distinct_recipient_gets_own_key() {
        let plan = TransferPlan::new(PAYER, OTHER, 42, BLOCKHASH, 1).unwrap();
        let message = plan.message_bytes();
        // Three account keys, instruction accounts [0, 1], program index 2
        assert_eq!(message[3], 3);
        let instruction_start = 3 + 1 + 3 * 32 + 32;
        assert_eq!(
            &message[instruction_start..instruction_start + 6],
            &[1, 2, 2, 0, 1, 12]
        );
    }

    #[test]
    fn zero_lamports_is_rejected() {
        let err = TransferPlan::self_transfer(PAYER, 0, BLOCKHASH, 1).unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(_)));
    }

    #[test]
    fn wire_wraps_signature_and_message() {
        let plan = TransferPlan::self_transfer(PAYER, 1, BLOCKHASH, 1).unwrap();
        let message = plan.message_bytes();
        let signature = [7u8; 64];
        let wire = assemble_wire(&message, &signature);
        assert_eq!(wire.len(), 1 + 64 + message.len());
        assert_eq!(wire[0], 1);
        assert_eq!(&wire[1..65], &signature);
        assert_eq!(&wire[65..], &message[..]);
    }
}
