//! Controller tests: scheduling policies, write-drain hysteresis, refresh.



/// Write-drain watermark hysteresis.
pub mod watermarks;
