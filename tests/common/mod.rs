#![allow(dead_code)]

pub mod logs {
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    /// In-memory log sink shared between the subscriber and the test.
    #[derive(Clone, Default)]
    pub struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl CaptureWriter {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    /// Run `f` with every log event on this thread captured as plain text.
    pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
        let writer = CaptureWriter::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer.clone())
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .finish();
        let result = tracing::subscriber::with_default(subscriber, f);
        (result, writer.contents())
    }

    /// Captured lines that mention `needle`.
    pub fn lines_with<'a>(logs: &'a str, needle: &str) -> Vec<&'a str> {
        logs.lines().filter(|l| l.contains(needle)).collect()
    }
}

pub mod nf {
    use nf_dispatch::config::RouteTable;
    use nf_dispatch::ids::NfId;
    use nf_dispatch::registry::HandlerRegistry;
    use nf_dispatch::transaction::Transaction;
    use nf_dispatch::transport::memory::Delivery;
    use nf_dispatch::worker_pool::NfContext;
    use crossbeam::channel::Receiver;
    use std::sync::Arc;
    use std::time::Duration;

    pub const OWN_ID: NfId = NfId(5);
    pub const OWN_NAME: &str = "currencyservice";
    pub const CALLER: NfId = NfId(2);

    pub fn context(registry: HandlerRegistry) -> Arc<NfContext> {
        Arc::new(NfContext::new(OWN_ID, OWN_NAME, registry, RouteTable::default()))
    }

    /// A transaction sent by [`CALLER`].
    pub fn txn(operation: &str) -> Transaction {
        Transaction::new(1, CALLER, operation).with_caller_nf("frontend")
    }

    /// Collect exactly `n` deliveries, failing the test if they do not arrive in time.
    pub fn collect(deliveries: &Receiver<Delivery>, n: usize) -> Vec<Delivery> {
        (0..n)
            .map(|i| {
                deliveries
                    .recv_timeout(Duration::from_secs(5))
                    .unwrap_or_else(|e| panic!("delivery {i} of {n} missing: {e}"))
            })
            .collect()
    }
}
