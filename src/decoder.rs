use crate::instructions::Mnemonic;

/// A tokenized statement split into its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded<'t> {
    pub label: Option<&'t str>,
    pub op: Mnemonic,
    /// Tokens after the mnemonic, commas included.
    pub operands: &'t [&'t str],
}

/// The mnemonic position held a word that is not in the instruction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unrecognized<'t>(pub &'t str);

/// Split tokens into `[label] MNEMONIC operands...`.
///
/// The first token is a label exactly when the second token is a known
/// mnemonic. Empty input decodes to `None`.
pub fn decode<'t>(tokens: &'t [&'t str]) -> Result<Option<Decoded<'t>>, Unrecognized<'t>> {
    let Some(&first) = tokens.first() else {
        return Ok(None);
    };
    if let Some(op) = tokens.get(1).and_then(|t| Mnemonic::lookup(t)) {
        return Ok(Some(Decoded {
            label: Some(first),
            op,
            operands: &tokens[2..],
        }));
    }
    match Mnemonic::lookup(first) {
        Some(op) => Ok(Some(Decoded {
            label: None,
            op,
            operands: &tokens[1..],
        })),
        None => Err(Unrecognized(first)),
    }
}
