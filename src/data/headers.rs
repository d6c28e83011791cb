//! Sender and recipient extraction from raw email messages

use crate::graph::RawRecord;

/// Addressing headers of one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHeaders {
    pub sender: Option<String>,

    /// Union of To, Cc and Bcc, in header order
    pub recipients: Vec<String>,
}

/// Reduce an address to its canonical form.
///
/// `"Jane Doe" <Jane.Doe@Enron.com>` and `jane.doe@enron.com` both become
/// `jane.doe@enron.com`. Returns `None` for a blank address.
pub fn canonicalize_address(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let address = match (trimmed.rfind('<'), trimmed.rfind('>')) {
        (Some(open), Some(close)) if open < close => &trimmed[open + 1..close],
        _ => trimmed,
    };
    let address = address.trim().trim_matches('"').trim();
    if address.is_empty() {
        None
    } else {
        Some(address.to_lowercase())
    }
}

/// Value of the first header called `name`, folded lines joined with a space
fn header_value(header_block: &[String], name: &str) -> Option<String> {
    header_block.iter().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

/// Parse the header block of an RFC 822 message.
///
/// The header block ends at the first empty line. Continuation lines (those
/// starting with whitespace) are unfolded into the preceding header.
pub fn parse_headers(message: &str) -> MessageHeaders {
    let mut header_block: Vec<String> = Vec::new();
    for line in message.lines() {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            if let Some(last) = header_block.last_mut() {
                last.push(' ');
                last.push_str(line.trim());
            }
            continue;
        }
        header_block.push(line.to_string());
    }

    let sender = header_value(&header_block, "From").and_then(|v| canonicalize_address(&v));

    let recipients = ["To", "Cc", "Bcc"]
        .iter()
        .filter_map(|name| header_value(&header_block, name))
        .flat_map(|value| {
            value
                .split(',')
                .filter_map(canonicalize_address)
                .collect::<Vec<_>>()
        })
        .collect();

    MessageHeaders { sender, recipients }
}

/// One record per recipient; nothing when the sender or all recipients are missing
pub fn message_records(message: &str) -> Vec<RawRecord> {
    let headers = parse_headers(message);
    match headers.sender {
        Some(sender) => headers
            .recipients
            .into_iter()
            .map(|recipient| RawRecord::new(sender.clone(), recipient))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &str = "Message-ID: <1.JavaMail.evans@thyme>\r\n\
From: phillip.allen@enron.com\r\n\
To: tim.belden@enron.com, \r\n\
\tjohn.lavorato@enron.com\r\n\
Cc: \"Ina Rangel\" <Ina.Rangel@enron.com>\r\n\
Subject: Re: forecast\r\n\
\r\n\
To: not-a-header@enron.com\r\n";

    #[test]
    fn folded_recipients_are_unfolded() {
        let headers = parse_headers(MESSAGE);
        assert_eq!(headers.sender.as_deref(), Some("phillip.allen@enron.com"));
        assert_eq!(
            headers.recipients,
            vec![
                "tim.belden@enron.com",
                "john.lavorato@enron.com",
                "ina.rangel@enron.com"
            ]
        );
    }

    #[test]
    fn body_lines_are_ignored() {
        let records = message_records(MESSAGE);
        assert_eq!(records.len(), 3);
        assert!(records
            .iter()
            .all(|r| r.destination.as_deref() != Some("not-a-header@enron.com")));
    }

    #[test]
    fn message_without_recipients_yields_nothing() {
        let message = "From: a@enron.com\nSubject: note to self\n\nbody";
        assert!(message_records(message).is_empty());
    }

    #[test]
    fn message_without_sender_yields_nothing() {
        let message = "To: a@enron.com\n\nbody";
        assert!(message_records(message).is_empty());
    }

    #[test]
    fn blank_addresses_are_dropped() {
        assert_eq!(canonicalize_address("  "), None);
        assert_eq!(canonicalize_address("<>"), None);
        assert_eq!(
            canonicalize_address(" Jeff.Skilling@Enron.com "),
            Some("jeff.skilling@enron.com".to_string())
        );
    }
}
