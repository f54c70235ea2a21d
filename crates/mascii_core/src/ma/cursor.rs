//! Token cursor shared by the value decoders.

use crate::error::{DecodeError, DecodeResult};
use crate::ma::infer::parse_bool;
use crate::ma::tokenizer::dequote;
use crate::ma::types::AttrType;

/// Forward-only cursor over a command's value tokens.
///
/// Every read names the attribute type being decoded so that running out
/// of tokens reports a [`DecodeError::TruncatedRecord`].
pub struct Cursor<'a> {
    tokens: &'a [String],
    position: usize,
    warnings: Vec<String>,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [String]) -> Self {
        Self {
            tokens,
            position: 0,
            warnings: Vec::new(),
        }
    }

    /// Index of the next token.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Next token without consuming it.
    pub fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(String::as_str)
    }

    /// All tokens not yet consumed.
    pub fn rest(&self) -> &'a [String] {
        &self.tokens[self.position..]
    }

    /// Consume everything that is left.
    pub fn skip_rest(&mut self) {
        self.position = self.tokens.len();
    }

    /// Fail unless at least `count` tokens remain.
    pub fn require(&self, attr_type: AttrType, count: usize) -> DecodeResult<()> {
        if self.remaining() < count {
            return Err(DecodeError::TruncatedRecord {
                attr_type,
                expected: count,
                actual: self.remaining(),
            });
        }
        Ok(())
    }

    /// Fail unless `count` items of `width` tokens each remain.
    ///
    /// A product too large for `usize` can never be satisfied and is reported
    /// as truncated.
    pub fn require_items(
        &self,
        attr_type: AttrType,
        count: usize,
        width: usize,
    ) -> DecodeResult<()> {
        let needed = count.checked_mul(width).ok_or(DecodeError::TruncatedRecord {
            attr_type,
            expected: usize::MAX,
            actual: self.remaining(),
        })?;
        self.require(attr_type, needed)
    }

    /// Consume one token.
    pub fn token(&mut self, attr_type: AttrType) -> DecodeResult<&'a str> {
        self.require(attr_type, 1)?;
        let token = self.tokens[self.position].as_str();
        self.position += 1;
        Ok(token)
    }

    pub fn int(&mut self, attr_type: AttrType) -> DecodeResult<i64> {
        let token = self.token(attr_type)?;
        token
            .parse::<i64>()
            .map_err(|_| DecodeError::InvalidNumber(token.to_string()))
    }

    /// Consume an integer that must fit the narrower type `T`.
    pub fn int_as<T: TryFrom<i64>>(&mut self, attr_type: AttrType) -> DecodeResult<T> {
        let token = self.token(attr_type)?;
        token
            .parse::<i64>()
            .ok()
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| DecodeError::InvalidNumber(token.to_string()))
    }

    /// Consume a non-negative element count.
    pub fn count(&mut self, attr_type: AttrType) -> DecodeResult<usize> {
        let token = self.token(attr_type)?;
        token
            .parse::<usize>()
            .map_err(|_| DecodeError::InvalidValue {
                expected: "element count",
                found: token.to_string(),
            })
    }

    pub fn float(&mut self, attr_type: AttrType) -> DecodeResult<f64> {
        let token = self.token(attr_type)?;
        token
            .parse::<f64>()
            .map_err(|_| DecodeError::InvalidNumber(token.to_string()))
    }

    /// Consume `N` floats.
    pub fn floats<const N: usize>(&mut self, attr_type: AttrType) -> DecodeResult<[f64; N]> {
        self.require(attr_type, N)?;
        let mut out = [0.0; N];
        for v in out.iter_mut() {
            *v = self.float(attr_type)?;
        }
        Ok(out)
    }

    /// Consume a counted float list (`count v1 v2 ...`).
    pub fn float_list(&mut self, attr_type: AttrType) -> DecodeResult<Vec<f64>> {
        let count = self.count(attr_type)?;
        self.require(attr_type, count)?;
        (0..count).map(|_| self.float(attr_type)).collect()
    }

    /// Consume a counted integer list (`count i1 i2 ...`).
    pub fn int_list(&mut self, attr_type: AttrType) -> DecodeResult<Vec<i64>> {
        let count = self.count(attr_type)?;
        self.require(attr_type, count)?;
        (0..count).map(|_| self.int(attr_type)).collect()
    }

    pub fn boolean(&mut self, attr_type: AttrType) -> DecodeResult<bool> {
        let token = self.token(attr_type)?;
        parse_bool(token).ok_or_else(|| DecodeError::InvalidValue {
            expected: "boolean",
            found: token.to_string(),
        })
    }

    /// Consume a string token, stripping its quotes.
    pub fn string(&mut self, attr_type: AttrType) -> DecodeResult<String> {
        Ok(dequote(self.token(attr_type)?).to_string())
    }

    /// Consume the next token if it equals `literal` (quotes ignored).
    pub fn accept(&mut self, literal: &str) -> bool {
        if self.peek().map(dequote) == Some(literal) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Record a lenient-decoding warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}", message);
        self.warnings.push(message);
    }

    /// Drain collected warnings.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }
}
