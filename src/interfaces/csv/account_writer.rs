use crate::domain::account::LedgerAccount;
use crate::error::Result;
use std::io::Write;

/// Writes ledger accounts as CSV with an `account,balance` header.
pub struct AccountWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> AccountWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_accounts<I>(&mut self, accounts: I) -> Result<()>
    where
        I: IntoIterator<Item = LedgerAccount>,
    {
        for account in accounts {
            self.writer.serialize(account)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{AccountId, Balance};

    #[test]
    fn test_write_accounts() {
        let mut buffer = Vec::new();
        {
            let mut writer = AccountWriter::new(&mut buffer);
            writer
                .write_accounts(vec![
                    LedgerAccount::new(AccountId(1), Balance::new(90)),
                    LedgerAccount::new(AccountId(2), Balance::new(5)),
                ])
                .unwrap();
        }

        let output = String::from_utf8(buffer).unwrap();
        assert_eq!(output, "account,balance\n1,90\n2,5\n");
    }
}
