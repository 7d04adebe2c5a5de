/// Default source sample rate (Hz)
pub const DEFAULT_SAMPLE_RATE: f64 = 48_000.0;
/// Default samples per source buffer
pub const DEFAULT_BUFFER_SIZE: usize = 1_024;
/// Largest accepted source buffer
pub const MAX_BUFFER_SIZE: usize = 1 << 20;
/// Default samples per symbol (4800 baud at 48 kHz)
pub const DEFAULT_SAMPLES_PER_SYMBOL: usize = 10;
/// Default synthetic tone offset (Hz)
pub const DEFAULT_TONE_HZ: f32 = 1_000.0;
/// Default C4FM inner-symbol deviation (Hz); outer symbols use three times this
pub const DEFAULT_DEVIATION_HZ: f32 = 600.0;
/// P25 frame sync, 24 dibits
pub const P25_SYNC_PATTERN: u64 = 0x5575_F5FF_77FF;
/// Default payload dibits between sync patterns
pub const DEFAULT_SYNC_INTERVAL: usize = 840;
/// Default bit errors tolerated by the sync correlator
pub const DEFAULT_MAX_SYNC_BIT_ERRORS: u32 = 4;
/// Default units per tap delivery for stream taps
pub const DEFAULT_BATCH_SIZE: usize = 64;
/// Largest accepted tap batch
pub const MAX_BATCH_SIZE: usize = 65_536;
/// Default buffers between power reports
pub const DEFAULT_POWER_INTERVAL: u64 = 10;
