//! # Frame Synchronizer
//!
//! Push-driven 802.11a/g receiver: the caller delivers complex baseband
//! samples at 20 Msample/s and the synchronizer emits frame-complete events
//! through a consumer-supplied callback. Detection is blind; all frame
//! parameters are recovered from the PLCP preamble and SIGNAL header.
//!
//! ## State machine
//!
//! ```text
//! SEEK_PLCP ──detect──▶ RX_SHORT0 ──▶ RX_SHORT1 ──▶ RX_LONG0 ──peak──▶
//!     ▲                                                │ timeout
//!     └──────────── failure / frame complete ◀─────────┘
//! RX_LONG1 ──▶ RX_SIGNAL ──▶ RX_DATA ──nsym symbols──▶ callback
//! ```
//!
//! SEEK_PLCP evaluates a short-training metric every 64 samples; the short
//! states estimate the coarse carrier offset from two 16-sample-spaced gain
//! estimates; RX_LONG0 finds the long-training boundary by per-sample
//! cross-correlation; RX_LONG1 refines the offset and forms the equalizer
//! gains; SIGNAL and DATA symbols are then FFT'd, equalized, pilot-phase
//! tracked and demodulated. Only failure or frame completion returns the
//! machine to SEEK_PLCP, so candidate detections mid-frame are ignored.
//!
//! The 80-sample input window, FFT plans, gain arrays and the encoded
//! message buffer are owned by the instance; the steady-state sample path
//! performs no allocation (the soft buffer is resized only when a SIGNAL
//! header announces a new rate/length combination).

use std::f32::consts::TAU;

use log::{debug, trace};
use num_complex::Complex32;

use crate::constants::{
    NUM_DATA_SUBCARRIERS, NUM_SUBCARRIERS, PILOT_BINS, PILOT_VALUES, SAMPLE_RATE, SYMBOL_LEN,
};
use crate::dsp::fft::Fft64;
use crate::dsp::modem;
use crate::dsp::nco::Nco;
use crate::frame::plcp::{PilotSequence, S0_BINS, S0_FREQ, S1_FREQ, S1_TIME};
use crate::frame::subcarrier::DATA_BINS;
use crate::phy::packet::{self, FrameParams};
use crate::phy::rate::{Modulation, RateCode};
use crate::phy::signal::Signal;
use crate::phy::{fec, interleave};
use crate::util::bits::set_bit;

/// sqrt(12)/64: short-sequence gain normalization over its 12 occupied bins.
const GAIN_S0: f32 = 0.054127;

/// Energy of one 64-sample long-training period (52 unit bins / 64).
const LONG_SEQ_ENERGY: f32 = 0.8125;

/// Adjacent occupied-bin pairs of the short sequence; the accumulated
/// phase difference across them yields the timing metric.
const S0_PAIRS: [(usize, usize); 10] = [
    (40, 44),
    (44, 48),
    (48, 52),
    (52, 56),
    (56, 60),
    (4, 8),
    (8, 12),
    (12, 16),
    (16, 20),
    (20, 24),
];

/// Samples allowed between short-training confirmation and the long
/// correlation peak before the search is abandoned (covers the longest
/// possible remainder of the preamble with margin).
const LONG_SEARCH_TIMEOUT: usize = 400;

/// A decoded (or failed) frame delivered through the callback.
///
/// When `valid` is false the rate/length/seed fields are best-effort: they
/// hold the decoded SIGNAL values when the header parsed but the DATA field
/// failed, and placeholders when the header itself was rejected.
#[derive(Debug, Clone, Copy)]
pub struct FrameEvent<'a> {
    pub rate: RateCode,
    pub length: usize,
    /// Scrambler seed recovered from the SERVICE prefix.
    pub seed: u8,
    pub payload: &'a [u8],
    pub valid: bool,
    /// Receive strength latched at PLCP detection, in dB relative to unit
    /// sample power.
    pub rssi_db: f32,
    /// Carrier frequency offset estimate, radians per sample.
    pub cfo: f32,
}

impl FrameEvent<'_> {
    /// CFO in Hz at the 20 MHz baseband rate.
    pub fn cfo_hz(&self) -> f32 {
        self.cfo * SAMPLE_RATE / TAU
    }
}

/// Frame-complete callback.
pub type FrameCallback = Box<dyn FnMut(FrameEvent<'_>) + 'static>;

/// Synchronizer tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    /// PLCP detection threshold on the energy-normalized |s_hat| metric.
    /// The clean reference stream scores about 4.3; the default sits at
    /// roughly a third of that.
    pub detection_threshold: f32,
    /// Normalized long-training correlation threshold in [0, 1].
    pub long_corr_threshold: f32,
    /// Hysteresis for the RX_SHORT1 confirmation pass: the metric may sag
    /// to this fraction of the detection threshold before the candidate is
    /// abandoned.
    pub confirm_ratio: f32,
    /// Deliver events with `valid = false` for frames that failed SIGNAL
    /// or DATA decoding instead of resetting silently.
    pub report_invalid: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            detection_threshold: 1.5,
            long_corr_threshold: 0.6,
            confirm_ratio: 0.5,
            report_invalid: false,
        }
    }
}

/// Running synchronizer counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStats {
    pub frames_detected: u64,
    pub frames_decoded: u64,
    pub signal_errors: u64,
    pub sync_failures: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    SeekPlcp,
    RxShort0,
    RxShort1,
    RxLong0,
    RxLong1,
    RxSignal,
    RxData,
}

/// 80-sample sliding window with contiguous reads.
///
/// Samples are written twice, one buffer-length apart, so the most recent
/// 80 samples are always available as a single slice.
struct SampleWindow {
    buf: [Complex32; 2 * SYMBOL_LEN],
    pos: usize,
}

impl SampleWindow {
    fn new() -> Self {
        SampleWindow {
            buf: [Complex32::new(0.0, 0.0); 2 * SYMBOL_LEN],
            pos: 0,
        }
    }

    #[inline]
    fn push(&mut self, x: Complex32) {
        self.buf[self.pos] = x;
        self.buf[self.pos + SYMBOL_LEN] = x;
        self.pos += 1;
        if self.pos == SYMBOL_LEN {
            self.pos = 0;
        }
    }

    /// Oldest-to-newest view of the last 80 samples.
    #[inline]
    fn as_slice(&self) -> &[Complex32] {
        &self.buf[self.pos..self.pos + SYMBOL_LEN]
    }

    fn snapshot(&self) -> [Complex32; SYMBOL_LEN] {
        let mut out = [Complex32::new(0.0, 0.0); SYMBOL_LEN];
        out.copy_from_slice(self.as_slice());
        out
    }

    fn clear(&mut self) {
        self.buf.fill(Complex32::new(0.0, 0.0));
        self.pos = 0;
    }
}

/// 802.11a/g frame synchronizer.
pub struct FrameSynchronizer {
    config: SyncConfig,
    callback: FrameCallback,

    fft: Fft64,
    scratch: [Complex32; NUM_SUBCARRIERS],
    window: SampleWindow,
    nco: Nco,
    pilots: PilotSequence,

    state: SyncState,
    timer: i32,
    search_count: usize,

    // Channel estimates
    g0a: [Complex32; NUM_SUBCARRIERS],
    g1a: [Complex32; NUM_SUBCARRIERS],
    gain: [Complex32; NUM_SUBCARRIERS],

    // Frame-level measurements
    rssi_db: f32,
    tau_hat: f32,

    // SIGNAL-derived reception parameters
    params: Option<FrameParams>,
    soft_enc: Vec<u8>,
    soft_pos: usize,
    sym_index: usize,

    stats: SyncStats,
}

impl FrameSynchronizer {
    pub fn new(callback: FrameCallback) -> Self {
        Self::with_config(SyncConfig::default(), callback)
    }

    pub fn with_config(config: SyncConfig, callback: FrameCallback) -> Self {
        FrameSynchronizer {
            config,
            callback,
            fft: Fft64::new(),
            scratch: [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS],
            window: SampleWindow::new(),
            nco: Nco::new(),
            pilots: PilotSequence::new(),
            state: SyncState::SeekPlcp,
            timer: 0,
            search_count: 0,
            g0a: [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS],
            g1a: [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS],
            gain: [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS],
            rssi_db: 0.0,
            tau_hat: 0.0,
            params: None,
            soft_enc: Vec::new(),
            soft_pos: 0,
            sym_index: 0,
            stats: SyncStats::default(),
        }
    }

    /// Process a buffer of baseband samples, invoking the callback for each
    /// frame completed within it, in temporal order.
    pub fn execute(&mut self, samples: &[Complex32]) {
        for &raw in samples {
            // Carrier correction applies from RX_SHORT0 onward; during the
            // seek the oscillator is untrained.
            let x = if self.state == SyncState::SeekPlcp {
                raw
            } else {
                self.nco.mix_down(raw)
            };
            self.window.push(x);

            match self.state {
                SyncState::SeekPlcp => self.execute_seekplcp(),
                SyncState::RxShort0 => self.execute_rxshort0(),
                SyncState::RxShort1 => self.execute_rxshort1(),
                SyncState::RxLong0 => self.execute_rxlong0(),
                SyncState::RxLong1 => self.execute_rxlong1(),
                SyncState::RxSignal => self.execute_rxsignal(),
                SyncState::RxData => self.execute_rxdata(),
            }
        }
    }

    /// Discard partial-frame state and return to the PLCP seek.
    pub fn reset(&mut self) {
        self.reset_internal();
    }

    /// Receive strength of the most recent detection, dB.
    pub fn rssi(&self) -> f32 {
        self.rssi_db
    }

    /// Current carrier-frequency-offset estimate, radians per sample.
    pub fn cfo(&self) -> f32 {
        self.nco.frequency()
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    // ------------------------------------------------------------------
    // state handlers
    // ------------------------------------------------------------------

    fn execute_seekplcp(&mut self) {
        self.timer += 1;
        if self.timer < 64 {
            return;
        }
        self.timer = 0;

        let rc = self.window.snapshot();
        let energy: f32 = rc[16..].iter().map(|c| c.norm_sqr()).sum();
        let g = 64.0 / (energy + 1e-6);

        let g0a = self.estimate_gain_s0(&rc[16..]);
        let s_hat = s0_metrics(&g0a) * g;
        let mag = s_hat.norm();
        trace!("seek: |s_hat| = {mag:.3}");

        if mag > self.config.detection_threshold {
            self.g0a = g0a;
            self.rssi_db = -10.0 * g.log10();
            self.tau_hat = s_hat.arg() * 32.0 / TAU;
            self.stats.frames_detected += 1;
            debug!(
                "PLCP detected: |s_hat| = {:.3}, tau_hat = {:+.2}, rssi = {:.1} dB",
                mag, self.tau_hat, self.rssi_db
            );
            self.state = SyncState::RxShort0;
            self.timer = 16;
        }
    }

    fn execute_rxshort0(&mut self) {
        self.timer -= 1;
        if self.timer > 0 {
            return;
        }

        // Second short-sequence estimate, 16 samples after the first: the
        // per-bin phase advance between the two is the carrier offset.
        let rc = self.window.snapshot();
        let g0b = self.estimate_gain_s0(&rc[16..]);

        let mut acc = Complex32::new(0.0, 0.0);
        for &bin in S0_BINS.iter() {
            acc += g0b[bin] * self.g0a[bin].conj();
        }
        let nu = acc.arg() / 16.0;
        self.nco.set_frequency(nu);
        debug!("coarse CFO: {:.6} rad/sample", nu);

        self.state = SyncState::RxShort1;
        self.timer = 16;
    }

    fn execute_rxshort1(&mut self) {
        self.timer -= 1;
        if self.timer > 0 {
            return;
        }

        // Confirmation window, now carrier-corrected. A collapsed metric
        // means the seek fired on noise.
        let rc = self.window.snapshot();
        let energy: f32 = rc[16..].iter().map(|c| c.norm_sqr()).sum();
        let g = 64.0 / (energy + 1e-6);
        let gb = self.estimate_gain_s0(&rc[16..]);
        let s_hat = s0_metrics(&gb) * g;

        if s_hat.norm() < self.config.confirm_ratio * self.config.detection_threshold {
            debug!("detection not confirmed (|s_hat| = {:.3})", s_hat.norm());
            self.stats.sync_failures += 1;
            self.reset_internal();
            return;
        }

        self.state = SyncState::RxLong0;
        self.search_count = 0;
    }

    fn execute_rxlong0(&mut self) {
        self.search_count += 1;
        if self.search_count > LONG_SEARCH_TIMEOUT {
            debug!("long-training search timed out");
            self.stats.sync_failures += 1;
            self.reset_internal();
            return;
        }

        // Slide until the newest 64 samples line up with the first long-
        // training copy.
        let rho = {
            let rc = self.window.as_slice();
            let mut corr = Complex32::new(0.0, 0.0);
            let mut energy = 0.0f32;
            for (x, s) in rc[16..].iter().zip(S1_TIME.iter()) {
                corr += *x * s.conj();
                energy += x.norm_sqr();
            }
            corr.norm() / (energy * LONG_SEQ_ENERGY).sqrt().max(1e-9)
        };

        if rho > self.config.long_corr_threshold {
            trace!("long-training correlation peak: rho = {rho:.3}");
            let rc = self.window.snapshot();
            self.g1a = self.estimate_gain_s1(&rc[16..]);
            self.state = SyncState::RxLong1;
            self.timer = 64;
        }
    }

    fn execute_rxlong1(&mut self) {
        self.timer -= 1;
        if self.timer > 0 {
            return;
        }

        let rc = self.window.snapshot();
        let g1b = self.estimate_gain_s1(&rc[16..]);

        // Residual CFO from the 64-sample spacing of the two copies, then
        // the equalizer gain as the per-bin average.
        let mut acc = Complex32::new(0.0, 0.0);
        for bin in 0..NUM_SUBCARRIERS {
            if S1_FREQ[bin].re != 0.0 {
                acc += g1b[bin] * self.g1a[bin].conj();
            }
        }
        let dnu = acc.arg() / 64.0;
        self.nco.adjust_frequency(dnu);

        for bin in 0..NUM_SUBCARRIERS {
            self.gain[bin] = (self.g1a[bin] + g1b[bin]) * 0.5;
        }

        debug!(
            "channel locked: residual CFO {:+.6} rad/sample, total {:+.6}",
            dnu,
            self.nco.frequency()
        );

        self.pilots = PilotSequence::new();
        self.state = SyncState::RxSignal;
        self.timer = 80;
    }

    fn execute_rxsignal(&mut self) {
        self.timer -= 1;
        if self.timer > 0 {
            return;
        }

        let rc = self.window.snapshot();
        self.scratch.copy_from_slice(&rc[16..]);
        self.fft.forward(&mut self.scratch);

        let polarity = self.pilots.next_polarity();
        let points = self.equalize_symbol(polarity);

        // BPSK hard decisions, de-interleave at (48, 1), half-rate decode.
        let mut sig_int = [0u8; 6];
        for (i, point) in points.iter().enumerate() {
            set_bit(&mut sig_int, i, modem::demodulate_hard(Modulation::Bpsk, *point));
        }
        let mut sig_enc = [0u8; 6];
        interleave::deinterleave_bits(48, 1, &sig_int, &mut sig_enc);
        let sig_dec = fec::decode_signal(&sig_enc);

        match Signal::unpack(&sig_dec).and_then(|s| FrameParams::new(s.rate, s.length)) {
            Ok(params) => {
                debug!(
                    "SIGNAL: rate {} Mbit/s, length {}, {} symbols",
                    params.rate.mbps(),
                    params.length,
                    params.nsym
                );
                let ncbps = params.rate.params().ncbps;
                self.soft_enc.clear();
                self.soft_enc.resize(params.nsym * ncbps, 0);
                self.soft_pos = 0;
                self.sym_index = 0;
                self.params = Some(params);
                self.state = SyncState::RxData;
                self.timer = 80;
            }
            Err(err) => {
                debug!("SIGNAL decode failed: {err}");
                self.stats.signal_errors += 1;
                if self.config.report_invalid {
                    let event = FrameEvent {
                        rate: RateCode::R6,
                        length: 0,
                        seed: 0,
                        payload: &[],
                        valid: false,
                        rssi_db: self.rssi_db,
                        cfo: self.nco.frequency(),
                    };
                    (self.callback)(event);
                }
                self.reset_internal();
            }
        }
    }

    fn execute_rxdata(&mut self) {
        self.timer -= 1;
        if self.timer > 0 {
            return;
        }
        self.timer = 80;

        let rc = self.window.snapshot();
        self.scratch.copy_from_slice(&rc[16..]);
        self.fft.forward(&mut self.scratch);

        let polarity = self.pilots.next_polarity();
        let points = self.equalize_symbol(polarity);

        let params = self.params.expect("in RX_DATA without parameters");
        let rp = params.rate.params();
        for point in points.iter() {
            let span = &mut self.soft_enc[self.soft_pos..self.soft_pos + rp.nbpsc];
            modem::demodulate_soft(rp.modulation, *point, span);
            self.soft_pos += rp.nbpsc;
        }

        self.sym_index += 1;
        if self.sym_index == params.nsym {
            self.finish_frame(params);
        }
    }

    fn finish_frame(&mut self, params: FrameParams) {
        match packet::decode(params.rate, params.length, &self.soft_enc) {
            Ok(decoded) => {
                self.stats.frames_decoded += 1;
                let event = FrameEvent {
                    rate: params.rate,
                    length: params.length,
                    seed: decoded.seed,
                    payload: &decoded.payload,
                    valid: true,
                    rssi_db: self.rssi_db,
                    cfo: self.nco.frequency(),
                };
                (self.callback)(event);
            }
            Err(err) => {
                debug!("DATA decode failed: {err}");
                if self.config.report_invalid {
                    let event = FrameEvent {
                        rate: params.rate,
                        length: params.length,
                        seed: 0,
                        payload: &[],
                        valid: false,
                        rssi_db: self.rssi_db,
                        cfo: self.nco.frequency(),
                    };
                    (self.callback)(event);
                }
            }
        }
        self.reset_internal();
    }

    // ------------------------------------------------------------------
    // estimation helpers
    // ------------------------------------------------------------------

    /// Channel gain over the short sequence's 12 occupied bins.
    fn estimate_gain_s0(&mut self, x: &[Complex32]) -> [Complex32; NUM_SUBCARRIERS] {
        debug_assert_eq!(x.len(), NUM_SUBCARRIERS);
        self.scratch.copy_from_slice(x);
        self.fft.forward(&mut self.scratch);

        let mut g = [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS];
        for &bin in S0_BINS.iter() {
            g[bin] = self.scratch[bin] * S0_FREQ[bin].conj() * GAIN_S0;
        }
        g
    }

    /// Channel gain over the long sequence's 52 occupied bins.
    fn estimate_gain_s1(&mut self, x: &[Complex32]) -> [Complex32; NUM_SUBCARRIERS] {
        debug_assert_eq!(x.len(), NUM_SUBCARRIERS);
        self.scratch.copy_from_slice(x);
        self.fft.forward(&mut self.scratch);

        let mut g = [Complex32::new(0.0, 0.0); NUM_SUBCARRIERS];
        for bin in 0..NUM_SUBCARRIERS {
            if S1_FREQ[bin].re != 0.0 {
                g[bin] = self.scratch[bin] * S1_FREQ[bin].conj();
            }
        }
        g
    }

    /// Equalize the transformed symbol in `scratch`: divide by the channel
    /// gain, measure the common phase error on the pilots against their
    /// expected polarity, and return the 48 de-rotated data points.
    fn equalize_symbol(&mut self, polarity: f32) -> [Complex32; NUM_DATA_SUBCARRIERS] {
        let mut acc = Complex32::new(0.0, 0.0);
        for (&bin, &value) in PILOT_BINS.iter().zip(PILOT_VALUES.iter()) {
            let y = div_guarded(self.scratch[bin], self.gain[bin]);
            acc += y * (value * polarity);
        }
        let cpe = acc.arg();
        let rot = Complex32::from_polar(1.0, -cpe);

        let mut points = [Complex32::new(0.0, 0.0); NUM_DATA_SUBCARRIERS];
        for (i, &bin) in DATA_BINS.iter().enumerate() {
            points[i] = div_guarded(self.scratch[bin], self.gain[bin]) * rot;
        }
        points
    }

    fn reset_internal(&mut self) {
        self.window.clear();
        self.nco.reset();
        self.pilots = PilotSequence::new();
        self.state = SyncState::SeekPlcp;
        self.timer = 0;
        self.search_count = 0;
        self.params = None;
        self.soft_pos = 0;
        self.sym_index = 0;
    }
}

/// Accumulated phase difference across adjacent occupied short-sequence
/// bins, normalized by the pair count.
fn s0_metrics(g: &[Complex32; NUM_SUBCARRIERS]) -> Complex32 {
    let mut s_hat = Complex32::new(0.0, 0.0);
    for (a, b) in S0_PAIRS {
        s_hat += g[b] * g[a].conj();
    }
    s_hat * 0.1
}

#[inline]
fn div_guarded(x: Complex32, g: Complex32) -> Complex32 {
    let d = g.norm_sqr();
    if d < 1e-12 {
        Complex32::new(0.0, 0.0)
    } else {
        x * g.conj() / d
    }
}
