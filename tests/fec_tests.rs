use wlan_rs::constants::{SOFTBIT_0, SOFTBIT_1};
use wlan_rs::phy::fec::{decode_signal, decode_soft, encode, encode_signal, encoded_bits};
use wlan_rs::phy::rate::FecRate;
use wlan_rs::util::bits::get_bit;

fn hard_to_soft(enc: &[u8], nbits: usize) -> Vec<u8> {
    (0..nbits)
        .map(|i| if get_bit(enc, i) != 0 { SOFTBIT_1 } else { SOFTBIT_0 })
        .collect()
}

#[test]
fn test_puncture_ratios() {
    // Over one full puncturing period: 2/3 keeps 3 of every 4 base bits,
    // 3/4 keeps 4 of every 6.
    assert_eq!(encoded_bits(FecRate::Half, 18), 36);
    assert_eq!(encoded_bits(FecRate::TwoThirds, 18), 27);
    assert_eq!(encoded_bits(FecRate::ThreeQuarters, 18), 24);
}

#[test]
fn test_encoder_is_deterministic_and_linear_in_zero() {
    let mut enc = vec![0xaau8; 12];
    encode(FecRate::Half, 48, &[0u8; 6], &mut enc);
    assert!(enc.iter().all(|&b| b == 0));
}

#[test]
fn test_roundtrip_long_message_all_rates() {
    for fec in [FecRate::Half, FecRate::TwoThirds, FecRate::ThreeQuarters] {
        // 1008 bits with a zero tail, as a DATA field would carry.
        let mut dec = vec![0u8; 126];
        for (i, b) in dec.iter_mut().enumerate().take(124) {
            *b = (i as u8).wrapping_mul(197).wrapping_add(3);
        }
        let nbits = dec.len() * 8;
        let enc_bits = encoded_bits(fec, nbits);
        let mut enc = vec![0u8; enc_bits.div_ceil(8)];
        encode(fec, nbits, &dec, &mut enc);

        let soft = hard_to_soft(&enc, enc_bits);
        let mut out = vec![0u8; dec.len()];
        decode_soft(fec, nbits, &soft, &mut out);
        assert_eq!(out, dec, "{fec:?}");
    }
}

#[test]
fn test_decoder_tolerates_erasures() {
    let mut dec = vec![0u8; 32];
    dec[..30].copy_from_slice(&[0x37u8; 30]);
    let nbits = dec.len() * 8;
    let mut enc = vec![0u8; 64];
    encode(FecRate::Half, nbits, &dec, &mut enc);

    let mut soft = hard_to_soft(&enc, nbits * 2);
    // Erase scattered single positions; the code recovers them.
    for pos in (7..soft.len()).step_by(31) {
        soft[pos] = 127;
    }
    let mut out = vec![0u8; 32];
    decode_soft(FecRate::Half, nbits, &soft, &mut out);
    assert_eq!(out, dec);
}

#[test]
fn test_decoder_corrects_burst_of_two() {
    let mut dec = vec![0u8; 24];
    dec[..22].copy_from_slice(b"soft viterbi decoding!");
    let nbits = dec.len() * 8;
    let mut enc = vec![0u8; 48];
    encode(FecRate::Half, nbits, &dec, &mut enc);

    let mut soft = hard_to_soft(&enc, nbits * 2);
    soft[100] = SOFTBIT_1 - soft[100];
    soft[101] = SOFTBIT_1 - soft[101];
    let mut out = vec![0u8; 24];
    decode_soft(FecRate::Half, nbits, &soft, &mut out);
    assert_eq!(out, dec);
}

#[test]
fn test_signal_field_codec() {
    // 24 bits in, 48 bits out, half rate, no puncturing.
    for header in [[0xb1u8, 0x30, 0x00], [0xd0, 0x01, 0x40], [0x11, 0xff, 0x00]] {
        let enc = encode_signal(&header);
        assert_eq!(decode_signal(&enc), header);
    }
}

#[test]
fn test_signal_codec_survives_one_hard_error() {
    let header = [0xb1u8, 0x30, 0x00];
    let mut enc = encode_signal(&header);
    enc[2] ^= 0x10;
    assert_eq!(decode_signal(&enc), header);
}
