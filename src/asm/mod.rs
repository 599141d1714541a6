//! Assembler facade: the seven-pass pipeline (parse, evaluate, assign
//! addresses, resolve labels, evaluate, diagnose, emit) described in the
//! module docs, driving `expr`, `segment`, `select`, and `sourcemap`.

pub mod directive;
pub mod error;
pub mod expr;
pub mod scanner;
pub mod segment;
pub mod select;
pub mod sourcemap;

use error::{AsmError, ErrorKind};
use expr::{ExprNode, NodeKind};
use scanner::PosStr;
use segment::{DataItem, OperandDescriptor, Segment, SegmentKind};
use sourcemap::SourceMap;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use crate::instr::{InstructionSet, Variant};

/// Caller-supplied knobs. There is no config-file layer (§1.1): a host
/// embedding this crate constructs one of these directly.
#[derive(Debug, Clone)]
pub struct AssembleOptions {
    pub origin: u16,
    pub hex_mode: bool,
    pub go65_header: bool,
}

impl Default for AssembleOptions {
    fn default() -> AssembleOptions {
        AssembleOptions {
            origin: 0x1000,
            hex_mode: false,
            go65_header: false,
        }
    }
}

/// Assembled code plus a flat list of human-readable diagnostics, matching
/// `Assembly.errors` in the contract (§6).
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub code: Vec<u8>,
    pub errors: Vec<String>,
}

/// Supplies the text of `.include`d files and the bytes of `.binary`d
/// files. Host-provided, since file I/O is explicitly out of scope for
/// this crate's own concerns (§1 Non-goals) beyond this one seam.
pub trait FileLoader {
    fn load_text(&self, path: &str) -> io::Result<String>;
    fn load_bytes(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Loads files relative to the filesystem, for `assemble_file`.
pub struct FsLoader;

impl FileLoader for FsLoader {
    fn load_text(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn load_bytes(&self, path: &str) -> io::Result<Vec<u8>> {
        fs::read(path)
    }
}

/// Assembles `source` (logically `filename`, used for diagnostics and the
/// source map's file list). `loader` resolves `.include`/`.binary`;
/// pass `None` if the source is known not to use them (any attempt then
/// becomes a `FileNotFound` diagnostic).
pub fn assemble(
    source: &str,
    filename: &str,
    options: &AssembleOptions,
    loader: Option<&dyn FileLoader>,
) -> (Assembly, SourceMap, Option<AsmError>) {
    let mut asm = Assembler::new(options.origin, options.hex_mode);
    asm.parse_source(source, filename, loader);
    asm.run();
    asm.finish()
}

/// Assembles a file on disk and writes `<stem>.bin`/`<stem>.map` beside it,
/// per §6's `assemble_file` contract.
pub fn assemble_file(path: &str, options: &AssembleOptions) -> io::Result<(Assembly, SourceMap)> {
    let source = fs::read_to_string(path)?;
    let loader = FsLoader;
    let (assembly, map, _sentinel) = assemble(&source, path, options, Some(&loader));

    let stem = Path::new(path).with_extension("");
    let bin_path = stem.with_extension("bin");
    let map_path = stem.with_extension("map");

    let mut bin_file = fs::File::create(bin_path)?;
    sourcemap::write_binary(&mut bin_file, map.origin, &assembly.code, options.go65_header)?;

    let mut map_file = fs::File::create(map_path)?;
    map.write_to(&mut map_file)?;

    Ok((assembly, map))
}

fn resolver<'a>(
    known: &'a HashMap<String, (i64, bool)>,
    here: Option<u16>,
) -> impl Fn(&str) -> Option<(i64, bool)> + 'a {
    move |name: &str| {
        if name == "$" {
            here.map(|h| (h as i64, true))
        } else {
            known.get(name).copied()
        }
    }
}

struct Assembler {
    origin: u16,
    hex_mode: bool,
    variant: Variant,
    nmos: InstructionSet,
    cmos: InstructionSet,
    files: Vec<String>,
    segments: Vec<Segment>,
    symbols: HashMap<String, ExprNode>,
    label_segment: HashMap<String, usize>,
    scope: String,
    errors: Vec<AsmError>,
    source_map: SourceMap,
}

impl Assembler {
    fn new(origin: u16, hex_mode: bool) -> Assembler {
        Assembler {
            origin,
            hex_mode,
            variant: Variant::Nmos,
            nmos: InstructionSet::new(Variant::Nmos),
            cmos: InstructionSet::new(Variant::Cmos),
            files: Vec::new(),
            segments: Vec::new(),
            symbols: HashMap::new(),
            label_segment: HashMap::new(),
            scope: String::new(),
            errors: Vec::new(),
            source_map: SourceMap::new(origin),
        }
    }

    fn instruction_set(&self, variant: Variant) -> &InstructionSet {
        match variant {
            Variant::Nmos => &self.nmos,
            Variant::Cmos => &self.cmos,
        }
    }

    fn push_error(&mut self, file_index: usize, row: usize, column: usize, line: &str, kind: ErrorKind) {
        let file = self.files.get(file_index).cloned().unwrap_or_default();
        self.errors.push(AsmError::new(&file, row, column, line, kind));
    }

    /// Rewrites every `.`/`@`-prefixed identifier in a freshly parsed
    /// expression into the private key its defining label would have
    /// been bound under, using the scope in effect right now. Must run
    /// immediately after `expr::parse`, while the current routine's scope
    /// still matches the one the reference was written in.
    fn rewrite_local_refs(&self, node: &mut ExprNode) {
        match &mut node.kind {
            NodeKind::Ident(name) => {
                if name.starts_with('.') || name.starts_with('@') {
                    *name = segment::scope_reference(&self.scope, name);
                }
            }
            NodeKind::Unary(_, child) => self.rewrite_local_refs(child),
            NodeKind::Binary(_, left, right) => {
                self.rewrite_local_refs(left);
                self.rewrite_local_refs(right);
            }
            NodeKind::Number(_) | NodeKind::Str(_) => {}
        }
    }

    // ---- pass 1: parse ------------------------------------------------

    fn parse_source(&mut self, source: &str, filename: &str, loader: Option<&dyn FileLoader>) {
        let file_index = self.files.len();
        self.files.push(filename.to_string());
        self.parse_lines(source, file_index, loader);
    }

    fn parse_lines(&mut self, source: &str, file_index: usize, loader: Option<&dyn FileLoader>) {
        for (i, raw_line) in source.lines().enumerate() {
            let row = i + 1;
            self.parse_line(raw_line, file_index, row, loader);
        }
    }

    fn parse_line(&mut self, raw_line: &str, file_index: usize, row: usize, loader: Option<&dyn FileLoader>) {
        let indented = raw_line
            .as_bytes()
            .first()
            .map(|&b| scanner::is_whitespace(b))
            .unwrap_or(true);

        let pos = PosStr::new(file_index, row, raw_line).strip_trailing_comment();
        if pos.text.trim().is_empty() || pos.text.trim_start().starts_with('*') {
            return;
        }

        let mut rest = pos.clone();
        let mut label: Option<String> = None;

        if !indented {
            let bytes = rest.text.as_bytes();
            if bytes.is_empty() || !scanner::is_label_start(bytes[0]) {
                self.push_error(file_index, row, 0, raw_line, ErrorKind::InvalidLabel(rest.text.to_string()));
                return;
            }
            let mut n = 1;
            while n < bytes.len() && scanner::is_label_body(bytes[n]) {
                n += 1;
            }
            let label_text = rest.trunc(n).text.to_string();
            rest = rest.consume(n);
            if rest.text.starts_with(':') {
                rest = rest.consume(1);
            }
            label = Some(label_text);
        }

        let (leading_ws, after_ws) = rest.consume_while(scanner::is_whitespace);
        let _ = leading_ws;
        rest = after_ws;

        if rest.text.trim().is_empty() {
            if let Some(name) = label {
                self.bind_label(&name, file_index, row, raw_line, None);
            }
            return;
        }

        let (word, after_word) = rest.consume_until(scanner::is_whitespace);
        let first_word = word.text;
        let (_, arg_text) = after_word.consume_while(scanner::is_whitespace);
        let args = arg_text.text.trim();

        if let Some(directive) = directive::lookup(first_word) {
            self.handle_directive(directive, args, label.as_deref(), file_index, row, raw_line, loader);
            return;
        }

        // Opcode line.
        let mnemonic = first_word.to_ascii_uppercase();
        if self.instruction_set(self.variant).find_by_mnemonic(&mnemonic).is_empty() {
            self.push_error(file_index, row, rest.column, raw_line, ErrorKind::InvalidOpcode(first_word.to_string()));
            return;
        }

        let (mode_guess, force_immediate, force_absolute, inner_text) = select::guess_mode(args);
        let expr = if inner_text.is_empty() {
            None
        } else {
            match expr::parse(&inner_text, self.hex_mode) {
                Ok(mut node) => {
                    self.rewrite_local_refs(&mut node);
                    Some(node)
                }
                Err(kind) => {
                    self.push_error(file_index, row, rest.column, raw_line, kind);
                    return;
                }
            }
        };

        let operand = OperandDescriptor {
            mode_guess,
            expr,
            force_immediate,
            force_absolute,
        };

        let segment_index = self.segments.len();
        self.segments.push(Segment {
            file_index,
            row,
            line_text: raw_line.to_string(),
            address: 0,
            kind: SegmentKind::Instruction {
                mnemonic,
                operand,
                opcode: None,
                length: 0,
                variant: self.variant,
            },
        });

        if let Some(name) = label {
            self.bind_label(&name, file_index, row, raw_line, Some(segment_index));
        }
    }

    fn bind_label(&mut self, name: &str, file_index: usize, row: usize, line: &str, segment_index: Option<usize>) {
        let (scoped, is_new_scope) = segment::scope_label(&self.scope, name);
        if is_new_scope {
            self.scope = scoped.clone();
        }
        if self.symbols.contains_key(&scoped) || self.label_segment.contains_key(&scoped) {
            self.push_error(file_index, row, 0, line, ErrorKind::DuplicateLabel(name.to_string()));
            return;
        }
        let index = segment_index.unwrap_or_else(|| {
            let idx = self.segments.len();
            self.segments.push(Segment {
                file_index,
                row,
                line_text: line.to_string(),
                address: 0,
                kind: SegmentKind::Mark,
            });
            idx
        });
        self.label_segment.insert(scoped, index);
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_directive(
        &mut self,
        directive: directive::Directive,
        args: &str,
        label: Option<&str>,
        file_index: usize,
        row: usize,
        raw_line: &str,
        loader: Option<&dyn FileLoader>,
    ) {
        use directive::Directive::*;

        macro_rules! parse_expr {
            ($text:expr) => {
                match expr::parse($text, self.hex_mode) {
                    Ok(mut node) => {
                        self.rewrite_local_refs(&mut node);
                        node
                    }
                    Err(kind) => {
                        self.push_error(file_index, row, 0, raw_line, kind);
                        return;
                    }
                }
            };
        }

        match directive {
            Origin => {
                if !self.segments.is_empty() {
                    self.push_error(file_index, row, 0, raw_line, ErrorKind::OriginAfterFirstSegment);
                    return;
                }
                let mut expr = parse_expr!(args);
                expr.evaluate(&|_| None);
                if expr.evaluated {
                    self.origin = expr.value as u16;
                    self.source_map.origin = self.origin;
                }
            }
            Equ => {
                let name = match label {
                    Some(n) => n.to_string(),
                    None => {
                        self.push_error(file_index, row, 0, raw_line, ErrorKind::InvalidDirective("=".to_string()));
                        return;
                    }
                };
                let expr = parse_expr!(args);
                let (scoped, is_new_scope) = segment::scope_label(&self.scope, &name);
                if is_new_scope {
                    self.scope = scoped.clone();
                }
                if self.symbols.contains_key(&scoped) || self.label_segment.contains_key(&scoped) {
                    self.push_error(file_index, row, 0, raw_line, ErrorKind::DuplicateLabel(name));
                    return;
                }
                self.symbols.insert(scoped, expr);
            }
            Byte | Word | Dword | TString => {
                let unit_size = match directive {
                    Byte => 1,
                    Word => 2,
                    Dword => 4,
                    TString => 1,
                    _ => unreachable!(),
                };
                let items = match self.parse_data_items(args, file_index, row, raw_line) {
                    Some(items) => items,
                    None => return,
                };
                let segment_index = self.segments.len();
                self.segments.push(Segment {
                    file_index,
                    row,
                    line_text: raw_line.to_string(),
                    address: 0,
                    kind: SegmentKind::Data {
                        unit_size,
                        high_bit_terminator: matches!(directive, TString),
                        items,
                    },
                });
                if let Some(name) = label {
                    self.bind_label(name, file_index, row, raw_line, Some(segment_index));
                }
            }
            Hex => {
                let digits: String = args.chars().filter(|c| !c.is_whitespace()).collect();
                if digits.len() % 2 != 0 {
                    self.push_error(file_index, row, 0, raw_line, ErrorKind::OddLengthHexString);
                    return;
                }
                let mut bytes = Vec::with_capacity(digits.len() / 2);
                let mut ok = true;
                for chunk in digits.as_bytes().chunks(2) {
                    let s = std::str::from_utf8(chunk).unwrap();
                    match u8::from_str_radix(s, 16) {
                        Ok(b) => bytes.push(b),
                        Err(_) => {
                            ok = false;
                            break;
                        }
                    }
                }
                if !ok {
                    self.push_error(file_index, row, 0, raw_line, ErrorKind::BadNumber(digits));
                    return;
                }
                let segment_index = self.segments.len();
                self.segments.push(Segment {
                    file_index,
                    row,
                    line_text: raw_line.to_string(),
                    address: 0,
                    kind: SegmentKind::Raw(bytes),
                });
                if let Some(name) = label {
                    self.bind_label(name, file_index, row, raw_line, Some(segment_index));
                }
            }
            Align => {
                let mut expr = parse_expr!(args);
                expr.evaluate(&|_| None);
                if !expr.evaluated {
                    self.push_error(file_index, row, 0, raw_line, ErrorKind::UnresolvedExpression);
                    return;
                }
                let boundary = expr.value;
                if boundary <= 0 || boundary > 256 || (boundary as u32).count_ones() != 1 {
                    self.push_error(file_index, row, 0, raw_line, ErrorKind::AlignmentNotPowerOfTwo);
                    return;
                }
                let segment_index = self.segments.len();
                self.segments.push(Segment {
                    file_index,
                    row,
                    line_text: raw_line.to_string(),
                    address: 0,
                    kind: SegmentKind::Align {
                        boundary: boundary as u32,
                    },
                });
                if let Some(name) = label {
                    self.bind_label(name, file_index, row, raw_line, Some(segment_index));
                }
            }
            Pad => {
                let (value_text, length_text) = match split_top_level_commas(args).as_slice() {
                    [v, l] => (v.clone(), l.clone()),
                    _ => {
                        self.push_error(
                            file_index,
                            row,
                            0,
                            raw_line,
                            ErrorKind::ExpressionSyntax(".pad requires value,length".to_string()),
                        );
                        return;
                    }
                };
                let value = parse_expr!(&value_text);
                let length = parse_expr!(&length_text);
                let segment_index = self.segments.len();
                self.segments.push(Segment {
                    file_index,
                    row,
                    line_text: raw_line.to_string(),
                    address: 0,
                    kind: SegmentKind::Pad { value, length },
                });
                if let Some(name) = label {
                    self.bind_label(name, file_index, row, raw_line, Some(segment_index));
                }
            }
            Export => {
                let name = args.trim();
                if name.is_empty() {
                    self.push_error(file_index, row, 0, raw_line, ErrorKind::InvalidDirective(".export".to_string()));
                    return;
                }
                let scoped = segment::scope_reference(&self.scope, name);
                let expr = ExprNode::reference(scoped);
                self.segments.push(Segment {
                    file_index,
                    row,
                    line_text: raw_line.to_string(),
                    address: 0,
                    kind: SegmentKind::Export {
                        name: name.to_string(),
                        expr,
                    },
                });
            }
            Include => {
                let path = strip_quotes(args.trim());
                match loader {
                    Some(loader) => match loader.load_text(path) {
                        Ok(text) => {
                            let child_index = self.files.len();
                            self.files.push(path.to_string());
                            self.parse_lines(&text, child_index, Some(loader));
                        }
                        Err(e) => {
                            self.push_error(file_index, row, 0, raw_line, ErrorKind::IoFailure(e.to_string()));
                        }
                    },
                    None => {
                        self.push_error(file_index, row, 0, raw_line, ErrorKind::FileNotFound(path.to_string()));
                    }
                }
            }
            Binary => {
                let path = strip_quotes(args.trim());
                match loader {
                    Some(loader) => match loader.load_bytes(path) {
                        Ok(bytes) => {
                            let segment_index = self.segments.len();
                            self.segments.push(Segment {
                                file_index,
                                row,
                                line_text: raw_line.to_string(),
                                address: 0,
                                kind: SegmentKind::Raw(bytes),
                            });
                            if let Some(name) = label {
                                self.bind_label(name, file_index, row, raw_line, Some(segment_index));
                            }
                        }
                        Err(e) => {
                            self.push_error(file_index, row, 0, raw_line, ErrorKind::IoFailure(e.to_string()));
                        }
                    },
                    None => {
                        self.push_error(file_index, row, 0, raw_line, ErrorKind::FileNotFound(path.to_string()));
                    }
                }
            }
            Arch => {
                let lowered = args.trim().to_ascii_lowercase();
                self.variant = match lowered.as_str() {
                    "6502" | "nmos" => Variant::Nmos,
                    "65c02" | "cmos" => Variant::Cmos,
                    _ => {
                        self.push_error(file_index, row, 0, raw_line, ErrorKind::InvalidDirective(args.to_string()));
                        return;
                    }
                };
            }
        }
    }

    fn parse_data_items(&mut self, args: &str, file_index: usize, row: usize, raw_line: &str) -> Option<Vec<DataItem>> {
        let mut items = Vec::new();
        for piece in split_top_level_commas(args) {
            let piece = piece.trim();
            if piece.starts_with('"') && piece.ends_with('"') && piece.len() >= 2 {
                items.push(DataItem::Str(piece[1..piece.len() - 1].to_string()));
            } else {
                match expr::parse(piece, self.hex_mode) {
                    Ok(mut node) => {
                        self.rewrite_local_refs(&mut node);
                        items.push(DataItem::Expr(node));
                    }
                    Err(kind) => {
                        self.push_error(file_index, row, 0, raw_line, kind);
                        return None;
                    }
                }
            }
        }
        Some(items)
    }

    // ---- driver ---------------------------------------------------------

    fn run(&mut self) {
        self.evaluate_pass();
        self.assign_addresses();
        self.resolve_labels();
        self.evaluate_pass();
        self.diagnose();
    }

    fn known_values(&self) -> HashMap<String, (i64, bool)> {
        self.symbols
            .iter()
            .filter(|(_, n)| n.evaluated)
            .map(|(k, n)| (k.clone(), (n.value, n.is_address)))
            .collect()
    }

    /// Fix-point iteration over every not-yet-evaluated expression: symbol
    /// table entries plus everything segments carry. Each segment binds
    /// `$` to its own address once that address has actually been
    /// assigned (nonzero, or a zero-length mark); before pass 3 runs, no
    /// segment has a real address yet, so `$` simply stays unresolved.
    fn evaluate_pass(&mut self) {
        loop {
            let mut progress = false;
            let known = self.known_values();

            for node in self.symbols.values_mut() {
                if !node.evaluated && node.evaluate(&resolver(&known, None)) {
                    progress = true;
                }
            }

            for segment in self.segments.iter_mut() {
                let here = if segment.address != 0 || matches!(segment.kind, SegmentKind::Mark) {
                    Some(segment.address)
                } else {
                    None
                };
                progress |= evaluate_segment_exprs(segment, &resolver(&known, here));
            }

            if !progress {
                break;
            }
        }
    }

    /// Walks every segment, assigning it the program counter as it stood
    /// when that segment was reached, then measuring how many bytes it
    /// will occupy (deciding the concrete opcode along the way for
    /// instruction segments). Works on an owned clone of each segment's
    /// `kind` rather than a live borrow into `self.segments`, since
    /// picking an opcode needs read access to `self.nmos`/`self.cmos` and
    /// reporting a selection failure needs to push onto `self.errors` —
    /// both of which would alias a `&mut self.segments[i]` borrow held
    /// across the same span.
    fn assign_addresses(&mut self) {
        let mut pc: u32 = self.origin as u32;
        for i in 0..self.segments.len() {
            let address = pc as u16;
            self.segments[i].address = address;

            let known = self.known_values();
            let file_index = self.segments[i].file_index;
            let row = self.segments[i].row;
            let line_text = self.segments[i].line_text.clone();
            let mut kind = self.segments[i].kind.clone();

            let length: u32 = match &mut kind {
                SegmentKind::Mark => 0,
                SegmentKind::Instruction {
                    mnemonic,
                    operand,
                    opcode,
                    length,
                    variant,
                } => {
                    if let Some(expr) = operand.expr.as_mut() {
                        if !expr.evaluated {
                            expr.evaluate(&resolver(&known, Some(address)));
                        }
                    }
                    // A still-unresolved operand is almost always a forward
                    // label reference. Treat it as address-valued so size()
                    // picks the absolute-family opcode rather than risking
                    // an undersized zero-page one that a later pass can't
                    // widen once bytes are already laid out.
                    let (value, is_address) = operand
                        .expr
                        .as_ref()
                        .map(|e| if e.evaluated { (e.value, e.is_address) } else { (0, true) })
                        .unwrap_or((0, false));
                    let size = operand.size(value, is_address);
                    let candidates = self.instruction_set(*variant).find_by_mnemonic(mnemonic);
                    match select::select(&candidates, operand, size) {
                        Ok(instr) => {
                            *opcode = Some(instr.opcode);
                            *length = instr.length;
                        }
                        Err(err_kind) => {
                            self.push_error(file_index, row, 0, &line_text, err_kind);
                            *length = 1;
                        }
                    }
                    self.source_map.add_line(address, file_index, row);
                    *length as u32
                }
                SegmentKind::Data { unit_size, items, .. } => {
                    let mut len = 0u32;
                    for item in items.iter_mut() {
                        match item {
                            DataItem::Expr(e) => {
                                if !e.evaluated {
                                    e.evaluate(&resolver(&known, Some(address)));
                                }
                                len += *unit_size as u32;
                            }
                            DataItem::Str(s) => len += s.len() as u32,
                        }
                    }
                    len
                }
                SegmentKind::Raw(bytes) => bytes.len() as u32,
                SegmentKind::Align { boundary } => {
                    let b = *boundary;
                    (b - (pc % b)) % b
                }
                SegmentKind::Pad { value, length } => {
                    if !value.evaluated {
                        value.evaluate(&resolver(&known, Some(address)));
                    }
                    if !length.evaluated {
                        length.evaluate(&resolver(&known, Some(address)));
                    }
                    if length.evaluated {
                        length.value.max(0) as u32
                    } else {
                        0
                    }
                }
                SegmentKind::Export { expr, .. } => {
                    if !expr.evaluated {
                        expr.evaluate(&resolver(&known, Some(address)));
                    }
                    0
                }
            };

            self.segments[i].kind = kind;
            pc += length;
        }

        if pc > 0x1_0000 {
            self.errors.push(AsmError::new("", 0, 0, "", ErrorKind::CodeExceeds64Kib));
        }
    }

    fn resolve_labels(&mut self) {
        let bindings: Vec<(String, usize)> = self.label_segment.drain().collect();
        for (name, segment_index) in bindings {
            let address = self.segments[segment_index].address;
            self.symbols.entry(name).or_insert_with(|| ExprNode::address(address as i64));
        }
    }

    fn diagnose(&mut self) {
        for (name, node) in self.symbols.iter() {
            if !node.evaluated {
                self.errors.push(AsmError::new("", 0, 0, name, ErrorKind::UnresolvedExpression));
            }
        }
        for segment in &self.segments {
            let unresolved = match &segment.kind {
                SegmentKind::Instruction { operand, .. } => {
                    operand.expr.as_ref().map(|e| !e.evaluated).unwrap_or(false)
                }
                SegmentKind::Data { items, .. } => items.iter().any(|item| match item {
                    DataItem::Expr(e) => !e.evaluated,
                    DataItem::Str(_) => false,
                }),
                SegmentKind::Pad { value, length } => !value.evaluated || !length.evaluated,
                SegmentKind::Export { expr, .. } => !expr.evaluated,
                _ => false,
            };
            if unresolved {
                let file = self.files.get(segment.file_index).cloned().unwrap_or_default();
                self.errors.push(AsmError::new(
                    &file,
                    segment.row,
                    0,
                    &segment.line_text,
                    ErrorKind::UnresolvedExpression,
                ));
            }
        }
    }

    fn finish(mut self) -> (Assembly, SourceMap, Option<AsmError>) {
        let mut code = Vec::new();

        for i in 0..self.segments.len() {
            let segment = self.segments[i].clone();
            match segment.kind {
                SegmentKind::Mark => {}
                SegmentKind::Instruction { operand, opcode, length, variant, .. } => {
                    let opcode = match opcode {
                        Some(o) => o,
                        None => continue,
                    };
                    code.push(opcode);
                    if length > 1 {
                        let value = operand.expr.as_ref().map(|e| e.value).unwrap_or(0);
                        if operand.mode_guess == crate::instr::AddressingMode::Abs
                            && length == 2
                            && matches!(
                                self.instruction_set(variant).decode(opcode).mode,
                                crate::instr::AddressingMode::Rel
                            )
                        {
                            let target = (segment.address as i32).wrapping_add(length as i32);
                            let offset = value as i32 - target;
                            if !(-128..=127).contains(&offset) {
                                self.errors.push(AsmError::new(
                                    &self.files[segment.file_index],
                                    segment.row,
                                    0,
                                    &segment.line_text,
                                    ErrorKind::BranchOffsetOutOfBounds(offset),
                                ));
                                code.push(0);
                            } else {
                                code.push(offset as u8);
                            }
                        } else {
                            for b in 0..(length - 1) {
                                code.push(((value >> (8 * b)) & 0xFF) as u8);
                            }
                        }
                    }
                }
                SegmentKind::Data { unit_size, high_bit_terminator, items } => {
                    let start = code.len();
                    for item in &items {
                        match item {
                            DataItem::Expr(e) => {
                                for b in 0..unit_size {
                                    code.push(((e.value >> (8 * b)) & 0xFF) as u8);
                                }
                            }
                            DataItem::Str(s) => code.extend_from_slice(s.as_bytes()),
                        }
                    }
                    if high_bit_terminator && code.len() > start {
                        let last = code.len() - 1;
                        code[last] |= 0x80;
                    }
                }
                SegmentKind::Raw(bytes) => code.extend_from_slice(&bytes),
                SegmentKind::Align { boundary } => {
                    let pad_len = (boundary - (segment.address as u32 % boundary)) % boundary;
                    code.extend(std::iter::repeat(0u8).take(pad_len as usize));
                }
                SegmentKind::Pad { value, length } => {
                    let len = length.value.max(0) as usize;
                    let fill = (value.value & 0xFF) as u8;
                    code.extend(std::iter::repeat(fill).take(len));
                }
                SegmentKind::Export { name, expr } => {
                    if expr.evaluated && expr.is_address {
                        self.source_map.add_export(name, expr.value as u16);
                    } else {
                        self.errors.push(AsmError::new(
                            &self.files[segment.file_index],
                            segment.row,
                            0,
                            &segment.line_text,
                            ErrorKind::ExportOfNonLabel(name),
                        ));
                    }
                }
            }
        }

        if code.len() > 0x1_0000 {
            self.errors.push(AsmError::new("", 0, 0, "", ErrorKind::CodeExceeds64Kib));
        }

        self.source_map.size = code.len() as u32;
        self.source_map.crc = crc32fast::hash(&code);
        self.source_map.files = self.files.clone();
        self.source_map.finalize();

        let sentinel = if self.errors.is_empty() {
            None
        } else {
            Some(AsmError::new("", 0, 0, "", ErrorKind::UnresolvedExpression))
        };

        let assembly = Assembly {
            code,
            errors: self.errors.iter().map(|e| e.message()).collect(),
        };

        (assembly, self.source_map, sentinel)
    }
}

fn evaluate_segment_exprs(segment: &mut Segment, resolve: &dyn Fn(&str) -> Option<(i64, bool)>) -> bool {
    let mut progress = false;
    match &mut segment.kind {
        SegmentKind::Instruction { operand, .. } => {
            if let Some(expr) = operand.expr.as_mut() {
                if !expr.evaluated && expr.evaluate(resolve) {
                    progress = true;
                }
            }
        }
        SegmentKind::Data { items, .. } => {
            for item in items.iter_mut() {
                if let DataItem::Expr(e) = item {
                    if !e.evaluated && e.evaluate(resolve) {
                        progress = true;
                    }
                }
            }
        }
        SegmentKind::Pad { value, length } => {
            if !value.evaluated && value.evaluate(resolve) {
                progress = true;
            }
            if !length.evaluated && length.evaluate(resolve) {
                progress = true;
            }
        }
        SegmentKind::Export { expr, .. } => {
            if !expr.evaluated && expr.evaluate(resolve) {
                progress = true;
            }
        }
        SegmentKind::Mark | SegmentKind::Raw(_) | SegmentKind::Align { .. } => {}
    }
    progress
}

/// Splits on commas that are not inside a quoted string or nested parens.
fn split_top_level_commas(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut current = String::new();
    for c in text.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' => {
                    depth += 1;
                    current.push(c);
                }
                ')' => {
                    depth -= 1;
                    current.push(c);
                }
                ',' if depth == 0 => {
                    parts.push(current.trim().to_string());
                    current = String::new();
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn strip_quotes(text: &str) -> &str {
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble_str(source: &str) -> (Assembly, SourceMap) {
        let options = AssembleOptions::default();
        let (assembly, map, _sentinel) = assemble(source, "main.asm", &options, None);
        (assembly, map)
    }

    #[test]
    fn simple_store_program_assembles_expected_bytes() {
        let (assembly, _map) = assemble_str("LDA #$5E\nSTA $15\nSTA $1500\n");
        assert!(assembly.errors.is_empty(), "{:?}", assembly.errors);
        assert_eq!(assembly.code, vec![0xA9, 0x5E, 0x85, 0x15, 0x8D, 0x00, 0x15]);
    }

    #[test]
    fn forward_label_reference_resolves_by_the_final_evaluate_pass() {
        let source = "JMP target\ntarget: NOP\n";
        let (assembly, _map) = assemble_str(source);
        assert!(assembly.errors.is_empty(), "{:?}", assembly.errors);
        assert_eq!(&assembly.code[0..1], &[0x4C]);
        assert_eq!(u16::from_le_bytes([assembly.code[1], assembly.code[2]]), 0x1003);
    }

    #[test]
    fn equ_constant_is_usable_before_and_after_definition() {
        let source = "VALUE = $42\nLDA #VALUE\n";
        let (assembly, _map) = assemble_str(source);
        assert!(assembly.errors.is_empty(), "{:?}", assembly.errors);
        assert_eq!(assembly.code, vec![0xA9, 0x42]);
    }

    #[test]
    fn export_of_a_label_lands_in_the_source_map() {
        let source = "start: NOP\n.export start\n";
        let (_assembly, map) = assemble_str(source);
        assert_eq!(map.exports, vec![("start".to_string(), 0x1000)]);
    }

    #[test]
    fn origin_after_first_segment_is_rejected() {
        let source = "NOP\n.org $2000\n";
        let (assembly, _map) = assemble_str(source);
        assert!(assembly
            .errors
            .iter()
            .any(|e| e.contains("origin directive after the first segment")));
    }

    #[test]
    fn byte_directive_emits_comma_separated_values() {
        let (assembly, _map) = assemble_str(".byte 1, 2, $10\n");
        assert_eq!(assembly.code, vec![1, 2, 0x10]);
    }

    #[test]
    fn undeclared_mnemonic_is_an_invalid_opcode_error() {
        let (assembly, _map) = assemble_str("FROB #$01\n");
        assert!(assembly.errors.iter().any(|e| e.contains("invalid opcode")));
    }

    #[test]
    fn round_trip_crc_matches_emitted_code() {
        let (assembly, map) = assemble_str("LDA #$01\nSTA $10\n");
        assert_eq!(map.crc, crc32fast::hash(&assembly.code));
        assert_eq!(map.size as usize, assembly.code.len());
    }

    #[test]
    fn local_label_scopes_to_the_enclosing_global_label() {
        let source = "main: LDA #$01\n.loop: BEQ .loop\nother: LDA #$02\n.loop: BEQ .loop\n";
        let (assembly, _map) = assemble_str(source);
        assert!(assembly.errors.is_empty(), "{:?}", assembly.errors);
    }
}
