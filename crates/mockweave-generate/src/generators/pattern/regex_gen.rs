//! Regex to sampler compilation.
//!
//! Patterns are parsed with `regex-syntax` and rewritten before they reach
//! `rand_regex`:
//!
//! - `\d`, `\w` and `\s` (and their negations) use their ASCII meaning, so
//!   `\d{4}` yields `0-9` digits rather than digits from any script.
//! - Anchors and word boundaries are dropped. Every sample is a whole match,
//!   so they constrain nothing the sampler can honor.

use rand_regex::Regex as RandRegex;
use regex_syntax::ast::parse::Parser;
use regex_syntax::ast::{
    Ast, ClassAscii, ClassAsciiKind, ClassBracketed, ClassPerl, ClassPerlKind, ClassSet,
    ClassSetItem,
};
use regex_syntax::hir::translate::Translator;
use regex_syntax::hir::{self, Hir, HirKind};

/// Compile `pattern` into a sampler. The error is a display message.
pub fn compile_regex(pattern: &str, max_repeat: u32) -> Result<RandRegex, String> {
    let mut ast = Parser::new()
        .parse(pattern)
        .map_err(|err| err.to_string())?;
    ascii_perl_classes(&mut ast);
    let hir = Translator::new()
        .translate(pattern, &ast)
        .map_err(|err| err.to_string())?;
    RandRegex::with_hir(without_assertions(hir), max_repeat).map_err(|err| err.to_string())
}

fn ascii_perl_classes(ast: &mut Ast) {
    let replacement = match &*ast {
        Ast::ClassPerl(perl) => Some(Ast::ClassBracketed(Box::new(ClassBracketed {
            span: perl.span,
            negated: false,
            kind: ClassSet::Item(ClassSetItem::Ascii(ascii_class(perl))),
        }))),
        _ => None,
    };
    if let Some(replacement) = replacement {
        *ast = replacement;
        return;
    }

    match ast {
        Ast::ClassBracketed(class) => ascii_class_set(&mut class.kind),
        Ast::Repetition(rep) => ascii_perl_classes(&mut rep.ast),
        Ast::Group(group) => ascii_perl_classes(&mut group.ast),
        Ast::Alternation(alt) => alt.asts.iter_mut().for_each(ascii_perl_classes),
        Ast::Concat(concat) => concat.asts.iter_mut().for_each(ascii_perl_classes),
        _ => {}
    }
}

fn ascii_class_set(set: &mut ClassSet) {
    match set {
        ClassSet::Item(item) => ascii_class_item(item),
        ClassSet::BinaryOp(op) => {
            ascii_class_set(&mut op.lhs);
            ascii_class_set(&mut op.rhs);
        }
    }
}

fn ascii_class_item(item: &mut ClassSetItem) {
    let replacement = match &*item {
        ClassSetItem::Perl(perl) => Some(ClassSetItem::Ascii(ascii_class(perl))),
        _ => None,
    };
    if let Some(replacement) = replacement {
        *item = replacement;
        return;
    }

    match item {
        ClassSetItem::Bracketed(class) => ascii_class_set(&mut class.kind),
        ClassSetItem::Union(union) => union.items.iter_mut().for_each(ascii_class_item),
        _ => {}
    }
}

fn ascii_class(perl: &ClassPerl) -> ClassAscii {
    let kind = match perl.kind {
        ClassPerlKind::Digit => ClassAsciiKind::Digit,
        ClassPerlKind::Space => ClassAsciiKind::Space,
        ClassPerlKind::Word => ClassAsciiKind::Word,
    };
    ClassAscii {
        span: perl.span,
        kind,
        negated: perl.negated,
    }
}

fn without_assertions(hir: Hir) -> Hir {
    match hir.into_kind() {
        HirKind::Empty | HirKind::Look(_) => Hir::empty(),
        HirKind::Literal(hir::Literal(bytes)) => Hir::literal(bytes),
        HirKind::Class(class) => Hir::class(class),
        HirKind::Repetition(hir::Repetition {
            min,
            max,
            greedy,
            sub,
        }) => Hir::repetition(hir::Repetition {
            min,
            max,
            greedy,
            sub: Box::new(without_assertions(*sub)),
        }),
        HirKind::Capture(hir::Capture { index, name, sub }) => Hir::capture(hir::Capture {
            index,
            name,
            sub: Box::new(without_assertions(*sub)),
        }),
        HirKind::Concat(subs) => Hir::concat(subs.into_iter().map(without_assertions).collect()),
        HirKind::Alternation(subs) => {
            Hir::alternation(subs.into_iter().map(without_assertions).collect())
        }
    }
}
