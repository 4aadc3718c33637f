#[cfg(feature = "cli")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessesToUpdate, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub memory_usage_percent: f32,
    pub peak_memory_mb: u64,
    pub available_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// Samples the layer-builder process and the host while a layer is being built.
///
/// CPU, memory and peak figures belong to layer-builder itself, not to the
/// native-image child. The compiler's footprint only shows up indirectly in
/// the host-wide available memory.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Arc<Mutex<System>>,
    pid: Option<Pid>,
    start_time: Instant,
    peak_memory: Arc<Mutex<u64>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new();
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("Unable to determine current PID, process stats disabled: {}", e);
                None
            }
        };

        if enabled {
            system.refresh_memory();
            system.refresh_processes(ProcessesToUpdate::All, true);
        }

        Self {
            system: Arc::new(Mutex::new(system)),
            pid,
            start_time: Instant::now(),
            peak_memory: Arc::new(Mutex::new(0)),
            enabled,
        }
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_memory();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let total_memory = system.total_memory() / 1024 / 1024;
        let available_memory_mb = system.available_memory() / 1024 / 1024;

        let (cpu_usage, memory_mb) = match self.pid.and_then(|pid| system.process(pid)) {
            Some(process) => (process.cpu_usage(), process.memory() / 1024 / 1024),
            None => (0.0, 0),
        };
        let memory_percent = if total_memory > 0 {
            (memory_mb as f32 / total_memory as f32) * 100.0
        } else {
            0.0
        };

        let mut peak = self.peak_memory.lock().ok()?;
        if memory_mb > *peak {
            *peak = memory_mb;
        }
        let peak_memory = *peak;

        Some(SystemStats {
            cpu_usage,
            memory_usage_mb: memory_mb,
            memory_usage_percent: memory_percent,
            peak_memory_mb: peak_memory,
            available_memory_mb,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_stats(&self, phase: &str) {
        if let Some(stats) = self.get_stats() {
            tracing::info!("{}", format_stats(phase, &stats));
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, layer-builder peak memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
pub fn format_stats(phase: &str, stats: &SystemStats) -> String {
    format!(
        "📊 {} - layer-builder process: CPU {:.1}%, Memory {}MB ({:.1}%), Peak {}MB; \
         host available memory (includes native-image): {}MB; Time: {:?}",
        phase,
        stats.cpu_usage,
        stats.memory_usage_mb,
        stats.memory_usage_percent,
        stats.peak_memory_mb,
        stats.available_memory_mb,
        stats.elapsed_time
    )
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// No-op stand-in when sysinfo is not compiled in.
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn log_stats(&self, _phase: &str) {}

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
