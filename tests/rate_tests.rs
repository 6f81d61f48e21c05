use wlan_rs::{compute_enc_msg_len, FecRate, Modulation, RateCode};

#[test]
fn test_table_78_values() {
    let expect: [(RateCode, Modulation, FecRate, usize, usize, usize); 8] = [
        (RateCode::R6, Modulation::Bpsk, FecRate::Half, 1, 48, 24),
        (RateCode::R9, Modulation::Bpsk, FecRate::ThreeQuarters, 1, 48, 36),
        (RateCode::R12, Modulation::Qpsk, FecRate::Half, 2, 96, 48),
        (RateCode::R18, Modulation::Qpsk, FecRate::ThreeQuarters, 2, 96, 72),
        (RateCode::R24, Modulation::Qam16, FecRate::Half, 4, 192, 96),
        (RateCode::R36, Modulation::Qam16, FecRate::ThreeQuarters, 4, 192, 144),
        (RateCode::R48, Modulation::Qam64, FecRate::TwoThirds, 6, 288, 192),
        (RateCode::R54, Modulation::Qam64, FecRate::ThreeQuarters, 6, 288, 216),
    ];
    for (rate, modulation, fec, nbpsc, ncbps, ndbps) in expect {
        let p = rate.params();
        assert_eq!(p.modulation, modulation, "{rate:?}");
        assert_eq!(p.fec, fec, "{rate:?}");
        assert_eq!(p.nbpsc, nbpsc, "{rate:?}");
        assert_eq!(p.ncbps, ncbps, "{rate:?}");
        assert_eq!(p.ndbps, ndbps, "{rate:?}");
    }
}

#[test]
fn test_table_80_signal_encodings() {
    let expect = [
        (RateCode::R6, 0b1101),
        (RateCode::R9, 0b1111),
        (RateCode::R12, 0b0101),
        (RateCode::R18, 0b0111),
        (RateCode::R24, 0b1001),
        (RateCode::R36, 0b1011),
        (RateCode::R48, 0b0001),
        (RateCode::R54, 0b0011),
    ];
    for (rate, bits) in expect {
        assert_eq!(rate.signal_bits(), bits, "{rate:?}");
        assert_eq!(RateCode::from_signal_bits(bits).unwrap(), rate);
    }
}

#[test]
fn test_derived_parameter_invariants() {
    for rate in RateCode::ALL {
        let p = rate.params();
        assert_eq!(p.ncbps, 48 * p.nbpsc);
        // ndbps = ncbps * code rate, exactly.
        let ndbps = match p.fec {
            FecRate::Half => p.ncbps / 2,
            FecRate::TwoThirds => p.ncbps * 2 / 3,
            FecRate::ThreeQuarters => p.ncbps * 3 / 4,
        };
        assert_eq!(p.ndbps, ndbps);
    }
}

#[test]
fn test_enc_msg_len_symbol_aligned() {
    for rate in RateCode::ALL {
        let ncbps = rate.params().ncbps;
        for length in 1..200 {
            let bytes = compute_enc_msg_len(rate, length).unwrap();
            assert_eq!((bytes * 8) % ncbps, 0, "{rate:?} length {length}");
        }
        assert_eq!(
            (compute_enc_msg_len(rate, 4095).unwrap() * 8) % ncbps,
            0,
            "{rate:?} max length"
        );
    }
}

#[test]
fn test_unknown_rate_rejected() {
    assert!(RateCode::try_from(7).is_err());
    assert!(RateCode::from_signal_bits(0b1110).is_err());
}
