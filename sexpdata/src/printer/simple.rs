use crate::registry::{BracketKind, Snapshot};

use super::{Print, Printer, SerializeError, SerializeOptions};

/// A printer that writes everything on one line.
struct SimplePrinter<'a> {
    needs_whitespace: bool,
    string: String,
    snapshot: &'a Snapshot,
    options: &'a SerializeOptions,
}

impl<'a> SimplePrinter<'a> {
    pub fn new(snapshot: &'a Snapshot, options: &'a SerializeOptions) -> Self {
        Self {
            needs_whitespace: false,
            string: String::new(),
            snapshot,
            options,
        }
    }

    #[inline]
    fn separate(&mut self) {
        if self.needs_whitespace {
            self.string.push(' ');
        }
    }
}

impl Printer for SimplePrinter<'_> {
    fn atom(&mut self, text: &str) -> Result<(), SerializeError> {
        self.separate();
        self.needs_whitespace = true;
        self.string.push_str(text);
        Ok(())
    }

    fn delimited<F>(&mut self, kind: BracketKind, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        self.separate();
        self.string.push(kind.opener());
        self.needs_whitespace = false;
        f(self)?;
        self.string.push(kind.closer());
        self.needs_whitespace = true;
        Ok(())
    }

    fn quoted<F>(&mut self, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        self.separate();
        self.string.push('\'');
        self.needs_whitespace = false;
        f(self)
    }

    #[inline]
    fn options(&self) -> &SerializeOptions {
        self.options
    }

    #[inline]
    fn snapshot(&self) -> &Snapshot {
        self.snapshot
    }
}

/// Print a `T` into an s-expression string.
///
/// This function does not produce any line breaks, indentation, or unnecessary whitespace.
/// Where human readability is a concern, consider using the [`to_string_pretty`] function instead.
///
/// [`to_string_pretty`]: `crate::printer::to_string_pretty`
pub fn to_string<T: Print>(
    value: T,
    snapshot: &Snapshot,
    options: &SerializeOptions,
) -> Result<String, SerializeError> {
    let mut printer = SimplePrinter::new(snapshot, options);
    value.print(&mut printer)?;
    Ok(printer.string)
}
