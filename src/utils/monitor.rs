use std::time::{Duration, Instant};

#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

/// 某個階段結束時的資源快照
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed: Duration,
}

/// 批次執行時的資源監控，停用時所有方法皆為空操作
#[cfg(feature = "cli")]
pub struct RunMonitor {
    probe: Option<(System, Pid)>,
    started: Instant,
    peak_memory_mb: u64,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        let probe = if enabled {
            match sysinfo::get_current_pid() {
                Ok(pid) => {
                    let mut system = System::new_with_specifics(RefreshKind::everything());
                    system.refresh_all();
                    Some((system, pid))
                }
                Err(e) => {
                    tracing::warn!("Run monitoring disabled: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Self {
            probe,
            started: Instant::now(),
            peak_memory_mb: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.probe.is_some()
    }

    pub fn sample(&mut self) -> Option<PhaseStats> {
        let (system, pid) = self.probe.as_mut()?;
        system.refresh_all();
        let process = system.process(*pid)?;

        let memory_mb = process.memory() / 1024 / 1024;
        self.peak_memory_mb = self.peak_memory_mb.max(memory_mb);

        Some(PhaseStats {
            cpu_usage: process.cpu_usage(),
            memory_mb,
            peak_memory_mb: self.peak_memory_mb,
            elapsed: self.started.elapsed(),
        })
    }

    pub fn log_phase(&mut self, phase: &str) {
        if let Some(stats) = self.sample() {
            tracing::info!(
                "📊 {} - CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                stats.cpu_usage,
                stats.memory_mb,
                stats.peak_memory_mb,
                stats.elapsed
            );
        }
    }
}

// 非 CLI 建置沒有 sysinfo，只保留計時
#[cfg(not(feature = "cli"))]
pub struct RunMonitor {
    started: Instant,
}

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn sample(&mut self) -> Option<PhaseStats> {
        None
    }

    pub fn log_phase(&mut self, phase: &str) {
        tracing::debug!("{} finished after {:?}", phase, self.started.elapsed());
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
