//! Newline-delimited JSON transport.
//!
//! Each inbound line is one serialized [`Transaction`]. Each outbound line is a
//! [`Delivery`](super::memory::Delivery): `{"destination": 2, "transaction": {...}}`.
//! Blank inbound lines are skipped; end of input is a clean [`TransportError::Closed`].

use super::memory::Delivery;
use super::{TransportRx, TransportTx};
use crate::error::TransportError;
use crate::ids::NfId;
use crate::transaction::Transaction;
use std::io::{BufRead, BufReader, Stdin, Write};

/// Reads one transaction per line from `R`.
pub struct JsonLinesRx<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> JsonLinesRx<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
        }
    }
}

impl JsonLinesRx<BufReader<Stdin>> {
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(BufReader::new(std::io::stdin()))
    }
}

impl<R: BufRead + Send> TransportRx for JsonLinesRx<R> {
    fn receive(&mut self) -> Result<Transaction, TransportError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(TransportError::Closed);
            }
            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }
            return serde_json::from_str(line).map_err(TransportError::Decode);
        }
    }
}

/// Writes one delivery per line to `W`, flushing after each.
pub struct JsonLinesTx<W> {
    writer: W,
}

impl<W: Write> JsonLinesTx<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonLinesTx<std::io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TransportTx for JsonLinesTx<W> {
    fn send(&mut self, transaction: Transaction, destination: NfId) -> Result<(), TransportError> {
        let delivery = Delivery {
            destination,
            transaction,
        };
        serde_json::to_writer(&mut self.writer, &delivery).map_err(TransportError::Encode)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_lines_until_eof() {
        let input = concat!(
            r#"{"route_id":1,"hop_count":0,"caller_fn":1,"operation_name":"A"}"#,
            "\n\n",
            r#"{"route_id":1,"hop_count":0,"caller_fn":1,"operation_name":"B"}"#,
            "\n",
        );
        let mut rx = JsonLinesRx::new(Cursor::new(input));

        assert_eq!(rx.receive().unwrap().operation_name, "A");
        assert_eq!(rx.receive().unwrap().operation_name, "B");
        assert!(matches!(rx.receive(), Err(TransportError::Closed)));
    }

    #[test]
    fn test_malformed_line_is_a_decode_error() {
        let mut rx = JsonLinesRx::new(Cursor::new("{not json}\n"));
        assert!(matches!(rx.receive(), Err(TransportError::Decode(_))));
    }

    #[test]
    fn test_writes_delivery_per_line() {
        let mut tx = JsonLinesTx::new(Vec::new());
        tx.send(Transaction::new(3, NfId(1), "A"), NfId(1)).unwrap();
        tx.send(Transaction::new(3, NfId(1), "B"), NfId(4)).unwrap();

        let out = String::from_utf8(tx.into_inner()).unwrap();
        let lines: Vec<Delivery> = out
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].destination, NfId(1));
        assert_eq!(lines[1].destination, NfId(4));
        assert_eq!(lines[1].transaction.operation_name, "B");
    }
}
