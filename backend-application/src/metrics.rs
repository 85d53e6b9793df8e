use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    records_created: AtomicU64,
    logins_accepted: AtomicU64,
    logins_rejected: AtomicU64,
    exports_written: AtomicU64,
    uploads_relayed: AtomicU64,
    upload_failures: AtomicU64,
}

impl Metrics {
    pub fn record_created(&self) {
        self.records_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_login(&self, accepted: bool) {
        if accepted {
            self.logins_accepted.fetch_add(1, Ordering::Relaxed);
        } else {
            self.logins_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_export(&self) {
        self.exports_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload(&self, relayed: bool) {
        if relayed {
            self.uploads_relayed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.upload_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn render_prometheus(&self) -> String {
        let created = self.records_created.load(Ordering::Relaxed);
        let accepted = self.logins_accepted.load(Ordering::Relaxed);
        let rejected = self.logins_rejected.load(Ordering::Relaxed);
        let exports = self.exports_written.load(Ordering::Relaxed);
        let uploads = self.uploads_relayed.load(Ordering::Relaxed);
        let upload_failures = self.upload_failures.load(Ordering::Relaxed);

        format!(
            "# TYPE rollcall_records_created_total counter\n\
rollcall_records_created_total {}\n\
# TYPE rollcall_logins_accepted_total counter\n\
rollcall_logins_accepted_total {}\n\
# TYPE rollcall_logins_rejected_total counter\n\
rollcall_logins_rejected_total {}\n\
# TYPE rollcall_exports_written_total counter\n\
rollcall_exports_written_total {}\n\
# TYPE rollcall_uploads_relayed_total counter\n\
rollcall_uploads_relayed_total {}\n\
# TYPE rollcall_upload_failures_total counter\n\
rollcall_upload_failures_total {}\n",
            created, accepted, rejected, exports, uploads, upload_failures
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_login_outcomes() {
        let metrics = Metrics::default();
        metrics.record_login(true);
        metrics.record_login(false);
        metrics.record_login(false);
        let text = metrics.render_prometheus();
        assert!(text.contains("rollcall_logins_accepted_total 1\n"));
        assert!(text.contains("rollcall_logins_rejected_total 2\n"));
    }
}
