use crate::registry::{BracketKind, Snapshot};

use super::{Print, Printer, SerializeError, SerializeOptions};
use pretty::DocAllocator as _;

/// A pretty printer that uses the `pretty` crate to format the output.
///
/// Line breaks are only placed between the items of a sequence, where a
/// parser sees them as plain whitespace.
struct PrettyPrinter<'a> {
    arena: &'a pretty::Arena<'a>,
    items: Vec<pretty::DocBuilder<'a, pretty::Arena<'a>>>,
    snapshot: &'a Snapshot,
    options: &'a SerializeOptions,
}

impl<'a> Printer for PrettyPrinter<'a> {
    fn atom(&mut self, text: &str) -> Result<(), SerializeError> {
        let doc = self.arena.text(text.to_string());
        self.items.push(doc);
        Ok(())
    }

    fn delimited<F>(&mut self, kind: BracketKind, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        let position = self.items.len();
        f(self)?;
        let items = self.items.drain(position..);

        let docs = self
            .arena
            .intersperse(items, self.arena.line())
            .nest(1)
            .group();

        self.items.push(
            self.arena
                .text(kind.opener().to_string())
                .append(docs)
                .append(self.arena.text(kind.closer().to_string())),
        );

        Ok(())
    }

    fn quoted<F>(&mut self, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        let position = self.items.len();
        f(self)?;
        let items = self.items.drain(position..);

        let inner = self.arena.concat(items);
        self.items.push(self.arena.text("'").append(inner));
        Ok(())
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

/// Pretty print a `T` into an s-expression string, breaking lines at `options.width`.
pub fn to_string_pretty<T: Print>(
    value: T,
    snapshot: &Snapshot,
    options: &SerializeOptions,
) -> Result<String, SerializeError> {
    let arena = pretty::Arena::new();
    let mut printer = PrettyPrinter {
        items: vec![],
        arena: &arena,
        snapshot,
        options,
    };

    value.print(&mut printer)?;

    let doc = arena.concat(printer.items);

    let mut string = String::new();
    let _ = doc.render_fmt(options.width, &mut string);
    Ok(string)
}

#[cfg(test)]
mod test {
    use crate::printer::{tosexp, SerializeOptions};
    use crate::value::Value;
    use crate::parse;

    #[test]
    fn breaks_long_lists() {
        let value = Value::List(
            (0..8)
                .map(|i| Value::List(vec![Value::symbol("item"), Value::Int(i)]))
                .collect(),
        );
        let options = SerializeOptions::default()
            .with_pretty_print(true)
            .with_width(20);

        let sexp = tosexp(&value, &options).unwrap();
        assert_eq!(
            "((item 0)\n (item 1)\n (item 2)\n (item 3)\n (item 4)\n (item 5)\n (item 6)\n (item 7))",
            sexp
        );
        assert_eq!(vec![value], parse(&sexp).unwrap());
    }

    #[test]
    fn short_lists_stay_on_one_line() {
        let value = Value::List(vec![Value::symbol("a"), Value::from("b")]);
        let options = SerializeOptions::default().with_pretty_print(true);
        assert_eq!(r#"(a "b")"#, tosexp(&value, &options).unwrap());
    }
}
