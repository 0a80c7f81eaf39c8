use super::{ZoneParseError, name::Name, record::RrType};
use log::{debug, trace};
use std::{
    collections::HashMap,
    net::{Ipv4Addr, Ipv6Addr},
};

const MAX_TTL: u32 = i32::MAX.unsigned_abs();

/// Record sets of a single type attached to one owner name
#[derive(Debug, Clone)]
pub struct RecordSet {
    rtype: RrType,
    ttl: u32,
    rdata: Vec<Vec<String>>,
}

impl RecordSet {
    #[must_use]
    pub const fn rtype(&self) -> RrType {
        self.rtype
    }

    /// Number of records in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.rdata.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rdata.is_empty()
    }
}

/// All record sets attached to one owner name, least recently added first
#[derive(Debug, Clone)]
pub struct Node {
    name: Name,
    rdatasets: Vec<RecordSet>,
}

impl Node {
    #[must_use]
    pub const fn name(&self) -> &Name {
        &self.name
    }

    #[must_use]
    pub fn rdatasets(&self) -> &[RecordSet] {
        &self.rdatasets
    }

    #[must_use]
    pub fn rdataset(&self, rtype: RrType) -> Option<&RecordSet> {
        self.rdatasets.iter().find(|set| set.rtype == rtype)
    }

    /// Merge a record into its set and move that set to the end of the node.
    ///
    /// A CNAME evicts every other data set; other data evicts a CNAME.
    /// DNSSEC types may coexist with either.
    fn add(&mut self, rtype: RrType, ttl: u32, rdata: Vec<String>) {
        let mut set = match self.rdatasets.iter().position(|set| set.rtype == rtype) {
            Some(pos) => self.rdatasets.remove(pos),
            None => RecordSet {
                rtype,
                ttl,
                rdata: Vec::new(),
            },
        };
        set.ttl = set.ttl.min(ttl);
        set.rdata.push(rdata);

        if rtype == RrType::Cname {
            self.rdatasets.retain(|other| other.rtype.is_cname_neutral());
        } else if !rtype.is_cname_neutral() {
            self.rdatasets.retain(|other| other.rtype != RrType::Cname);
        }
        self.rdatasets.push(set);
    }
}

/// A parsed zone: owner-name nodes in the order they first appear in the file
#[derive(Debug, Clone)]
pub struct Zone {
    origin: Name,
    nodes: Vec<Node>,
    index: HashMap<Name, usize>,
}

impl Zone {
    fn new(origin: Name) -> Self {
        Self {
            origin,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn origin(&self) -> &Name {
        &self.origin
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, name: &Name) -> Option<&Node> {
        self.index.get(name).and_then(|&pos| self.nodes.get(pos))
    }

    /// Require an SOA and an NS record set at the zone origin
    ///
    /// # Errors
    ///
    /// Returns `NoSoa` or `NoNs` when the apex records are missing
    pub fn check_origin(&self) -> Result<(), ZoneParseError> {
        let apex = self.node(&self.origin);
        if apex.and_then(|node| node.rdataset(RrType::Soa)).is_none() {
            return Err(ZoneParseError::NoSoa);
        }
        if apex.and_then(|node| node.rdataset(RrType::Ns)).is_none() {
            return Err(ZoneParseError::NoNs);
        }
        Ok(())
    }

    fn add(&mut self, owner: Name, rtype: RrType, ttl: u32, rdata: Vec<String>) {
        let pos = if let Some(&pos) = self.index.get(&owner) {
            pos
        } else {
            let pos = self.nodes.len();
            self.index.insert(owner.clone(), pos);
            self.nodes.push(Node {
                name: owner,
                rdatasets: Vec::new(),
            });
            pos
        };

        if let Some(node) = self.nodes.get_mut(pos) {
            node.add(rtype, ttl, rdata);
        }
    }
}

/// A lexed token; quoted strings keep their content without the quotes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
}

/// One logical line (parentheses folded) of the master file
#[derive(Debug)]
struct Entry {
    line: usize,
    owner_omitted: bool,
    tokens: Vec<Token>,
}

#[derive(Default)]
struct Lexer {
    entries: Vec<Entry>,
    tokens: Vec<Token>,
    current: String,
    line: usize,
    entry_line: usize,
    owner_omitted: bool,
    depth: usize,
    paren_line: usize,
    at_line_start: bool,
}

impl Lexer {
    fn flush_token(&mut self) {
        if !self.current.is_empty() {
            self.tokens.push(Token {
                text: std::mem::take(&mut self.current),
                quoted: false,
            });
        }
    }

    fn flush_entry(&mut self) {
        self.flush_token();
        if !self.tokens.is_empty() {
            self.entries.push(Entry {
                line: self.entry_line,
                owner_omitted: self.owner_omitted,
                tokens: std::mem::take(&mut self.tokens),
            });
        }
    }

    fn run(mut self, contents: &str) -> Result<Vec<Entry>, ZoneParseError> {
        let mut chars = contents.chars().peekable();
        self.line = 1;
        self.at_line_start = true;

        while let Some(c) = chars.next() {
            if self.at_line_start && self.depth == 0 {
                self.at_line_start = false;
                self.entry_line = self.line;
                self.owner_omitted = c == ' ' || c == '\t';
            }

            match c {
                '\n' => {
                    if self.depth == 0 {
                        self.flush_entry();
                        self.at_line_start = true;
                    } else {
                        self.flush_token();
                    }
                    self.line += 1;
                }
                ';' => {
                    while chars.next_if(|&next| next != '\n').is_some() {}
                }
                '(' => {
                    self.flush_token();
                    if self.depth == 0 {
                        self.paren_line = self.line;
                    }
                    self.depth += 1;
                }
                ')' => {
                    self.flush_token();
                    if self.depth == 0 {
                        return Err(ZoneParseError::UnbalancedParentheses { line: self.line });
                    }
                    self.depth -= 1;
                }
                '"' => {
                    self.flush_token();
                    let text = self.quoted(&mut chars)?;
                    self.tokens.push(Token { text, quoted: true });
                }
                '\\' => {
                    self.current.push(c);
                    if let Some(escaped) = chars.next() {
                        if escaped == '\n' {
                            self.line += 1;
                        }
                        self.current.push(escaped);
                    }
                }
                c if c.is_whitespace() => self.flush_token(),
                c => self.current.push(c),
            }
        }

        if self.depth > 0 {
            return Err(ZoneParseError::UnbalancedParentheses {
                line: self.paren_line,
            });
        }
        self.flush_entry();

        Ok(self.entries)
    }

    fn quoted(
        &self,
        chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    ) -> Result<String, ZoneParseError> {
        let mut text = String::new();
        loop {
            match chars.next() {
                Some('"') => return Ok(text),
                Some('\\') => {
                    text.push('\\');
                    if let Some(escaped) = chars.next() {
                        text.push(escaped);
                    }
                }
                Some('\n') | None => {
                    return Err(ZoneParseError::UnterminatedQuote { line: self.line });
                }
                Some(c) => text.push(c),
            }
        }
    }
}

struct ParserState {
    origin: Name,
    default_ttl: Option<u32>,
    last_ttl: u32,
    last_owner: Option<Name>,
}

/// Decode raw zone file bytes as UTF-8.
///
/// # Errors
///
/// Returns `Encoding` with the line of the first invalid byte
pub fn decode_zone(bytes: &[u8]) -> Result<&str, ZoneParseError> {
    std::str::from_utf8(bytes).map_err(|e| {
        let valid = bytes.get(..e.valid_up_to()).unwrap_or_default();
        ZoneParseError::Encoding {
            line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
        }
    })
}

/// Parse master-file `contents` for the zone rooted at `origin`.
///
/// Records whose owner falls outside `origin` are skipped.
///
/// # Errors
///
/// Returns a `ZoneParseError` describing the first malformed line
pub fn parse_zone(contents: &str, origin: &Name) -> Result<Zone, ZoneParseError> {
    let entries = Lexer::default().run(contents)?;
    let mut zone = Zone::new(origin.clone());
    let mut state = ParserState {
        origin: origin.clone(),
        default_ttl: None,
        last_ttl: 0,
        last_owner: None,
    };

    for entry in entries {
        let is_directive = !entry.owner_omitted
            && entry
                .tokens
                .first()
                .is_some_and(|t| !t.quoted && t.text.starts_with('$'));

        if is_directive {
            parse_directive(&entry, &mut state)?;
        } else {
            parse_record(&entry, &mut state, &mut zone)?;
        }
    }

    Ok(zone)
}

fn parse_directive(entry: &Entry, state: &mut ParserState) -> Result<(), ZoneParseError> {
    let line = entry.line;
    let mut tokens = entry.tokens.iter().map(|t| t.text.as_str());
    let directive = tokens.next().unwrap_or_default().to_ascii_uppercase();
    trace!("line {line}: directive {directive}");

    match directive.as_str() {
        "$ORIGIN" => {
            let text = tokens
                .next()
                .ok_or_else(|| ZoneParseError::syntax(line, "$ORIGIN requires a domain name"))?;
            state.origin = Name::parse(text, &state.origin)
                .map_err(|e| ZoneParseError::syntax(line, format!("bad $ORIGIN {text}: {e}")))?;
        }
        "$TTL" => {
            let text = tokens
                .next()
                .ok_or_else(|| ZoneParseError::syntax(line, "$TTL requires a value"))?;
            state.default_ttl = Some(parse_ttl(text).ok_or_else(|| ZoneParseError::BadTtl {
                line,
                value: text.to_string(),
            })?);
        }
        "$INCLUDE" | "$GENERATE" => {
            return Err(ZoneParseError::UnsupportedDirective { line, directive });
        }
        _ => {
            return Err(ZoneParseError::syntax(
                line,
                format!("unknown directive {directive}"),
            ));
        }
    }

    if let Some(extra) = tokens.next() {
        return Err(ZoneParseError::syntax(
            line,
            format!("unexpected {extra} after {directive}"),
        ));
    }

    Ok(())
}

fn parse_record(
    entry: &Entry,
    state: &mut ParserState,
    zone: &mut Zone,
) -> Result<(), ZoneParseError> {
    let line = entry.line;
    let mut tokens = entry.tokens.as_slice();

    let owner = if entry.owner_omitted {
        state
            .last_owner
            .clone()
            .ok_or_else(|| ZoneParseError::syntax(line, "record without an owner name"))?
    } else {
        let (first, rest) = tokens
            .split_first()
            .ok_or_else(|| ZoneParseError::syntax(line, "empty record"))?;
        tokens = rest;
        Name::parse(&first.text, &state.origin).map_err(|e| {
            ZoneParseError::syntax(line, format!("bad owner name {}: {e}", first.text))
        })?
    };
    state.last_owner = Some(owner.clone());

    // TTL and class, in either order
    let mut ttl = None;
    let mut class_seen = false;
    while let Some((token, rest)) = tokens.split_first() {
        let text = token.text.as_str();
        if ttl.is_none() && text.starts_with(|c: char| c.is_ascii_digit()) {
            ttl = Some(parse_ttl(text).ok_or_else(|| ZoneParseError::BadTtl {
                line,
                value: text.to_string(),
            })?);
        } else if !class_seen && is_class(text) {
            if !text.eq_ignore_ascii_case("IN") {
                return Err(ZoneParseError::BadClass {
                    line,
                    class: text.to_string(),
                });
            }
            class_seen = true;
        } else {
            break;
        }
        tokens = rest;
    }

    let (type_token, rdata) = tokens
        .split_first()
        .ok_or_else(|| ZoneParseError::syntax(line, "missing record type"))?;
    let rtype = type_token
        .text
        .parse::<RrType>()
        .map_err(|()| ZoneParseError::UnknownRecordType {
            line,
            token: type_token.text.clone(),
        })?;

    let rdata: Vec<&str> = rdata.iter().map(|t| t.text.as_str()).collect();
    validate_rdata(rtype, &rdata, &state.origin, line)?;

    let ttl = ttl.or(state.default_ttl).unwrap_or(state.last_ttl);
    state.last_ttl = ttl;

    if !owner.is_subdomain_of(zone.origin()) {
        debug!(
            "line {line}: skipping {rtype} record for {owner}, outside zone {}",
            zone.origin()
        );
        return Ok(());
    }

    zone.add(
        owner,
        rtype,
        ttl,
        rdata.into_iter().map(str::to_string).collect(),
    );

    Ok(())
}

fn is_class(text: &str) -> bool {
    let upper = text.to_ascii_uppercase();
    matches!(
        upper.as_str(),
        "IN" | "CH" | "CHAOS" | "HS" | "HESIOD" | "NONE" | "ANY"
    ) || upper
        .strip_prefix("CLASS")
        .is_some_and(|code| code.parse::<u16>().is_ok())
}

/// Parse a TTL, plain seconds or BIND units (`1h30m`, `2d`, `1w`)
#[must_use]
pub fn parse_ttl(text: &str) -> Option<u32> {
    if text.is_empty() || !text.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }

    let mut total: u64 = 0;
    let mut current: u64 = 0;
    let mut digits = false;
    let mut used_units = false;

    for c in text.chars() {
        if let Some(digit) = c.to_digit(10) {
            current = current.checked_mul(10)?.checked_add(u64::from(digit))?;
            digits = true;
            continue;
        }
        if !digits {
            return None;
        }
        let unit: u64 = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            _ => return None,
        };
        total = total.checked_add(current.checked_mul(unit)?)?;
        current = 0;
        digits = false;
        used_units = true;
    }

    if used_units && digits {
        // trailing number after a unit, e.g. "1h30"
        return None;
    }
    total = total.checked_add(current)?;

    u32::try_from(total).ok().filter(|&ttl| ttl <= MAX_TTL)
}

fn expect_count(
    rtype: RrType,
    rdata: &[&str],
    count: usize,
    line: usize,
) -> Result<(), ZoneParseError> {
    match rdata.len() {
        n if n < count => Err(ZoneParseError::bad_rdata(
            line,
            rtype,
            format!("expected {count} field(s), found {n}"),
        )),
        n if n > count => Err(ZoneParseError::bad_rdata(
            line,
            rtype,
            format!("unexpected trailing field {:?}", rdata.get(count).unwrap_or(&"")),
        )),
        _ => Ok(()),
    }
}

fn expect_name(
    rtype: RrType,
    text: &str,
    origin: &Name,
    line: usize,
) -> Result<(), ZoneParseError> {
    Name::parse(text, origin)
        .map(|_| ())
        .map_err(|e| ZoneParseError::bad_rdata(line, rtype, format!("bad name {text}: {e}")))
}

fn expect_u16(rtype: RrType, text: &str, what: &str, line: usize) -> Result<(), ZoneParseError> {
    text.parse::<u16>()
        .map(|_| ())
        .map_err(|_| ZoneParseError::bad_rdata(line, rtype, format!("bad {what} {text}")))
}

/// RFC 3597 `\# <length> <hex>...` form, valid for any record type
fn validate_generic(rtype: RrType, rdata: &[&str], line: usize) -> Result<(), ZoneParseError> {
    let Some((length, hex)) = rdata.split_first() else {
        return Err(ZoneParseError::bad_rdata(line, rtype, "missing generic rdata length"));
    };
    let length = length.parse::<u16>().map_err(|_| {
        ZoneParseError::bad_rdata(line, rtype, format!("bad generic rdata length {length}"))
    })?;

    let hex = hex.concat();
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ZoneParseError::bad_rdata(line, rtype, format!("bad hex data {hex}")));
    }
    if hex.len() != usize::from(length) * 2 {
        return Err(ZoneParseError::bad_rdata(
            line,
            rtype,
            format!("generic rdata is {} bytes, expected {length}", hex.len() / 2),
        ));
    }

    Ok(())
}

fn validate_rdata(
    rtype: RrType,
    rdata: &[&str],
    origin: &Name,
    line: usize,
) -> Result<(), ZoneParseError> {
    if let Some((&r"\#", generic)) = rdata.split_first() {
        return validate_generic(rtype, generic, line);
    }

    match rtype {
        RrType::A => {
            expect_count(rtype, rdata, 1, line)?;
            let text = rdata.first().copied().unwrap_or_default();
            text.parse::<Ipv4Addr>().map_err(|_| {
                ZoneParseError::bad_rdata(line, rtype, format!("bad IPv4 address {text}"))
            })?;
        }
        RrType::Aaaa => {
            expect_count(rtype, rdata, 1, line)?;
            let text = rdata.first().copied().unwrap_or_default();
            text.parse::<Ipv6Addr>().map_err(|_| {
                ZoneParseError::bad_rdata(line, rtype, format!("bad IPv6 address {text}"))
            })?;
        }
        RrType::Ns | RrType::Cname | RrType::Ptr | RrType::Dname => {
            expect_count(rtype, rdata, 1, line)?;
            expect_name(rtype, rdata.first().copied().unwrap_or_default(), origin, line)?;
        }
        RrType::Mx => {
            expect_count(rtype, rdata, 2, line)?;
            if let [preference, exchange] = rdata {
                expect_u16(rtype, preference, "preference", line)?;
                expect_name(rtype, exchange, origin, line)?;
            }
        }
        RrType::Srv => {
            expect_count(rtype, rdata, 4, line)?;
            if let [priority, weight, port, target] = rdata {
                expect_u16(rtype, priority, "priority", line)?;
                expect_u16(rtype, weight, "weight", line)?;
                expect_u16(rtype, port, "port", line)?;
                expect_name(rtype, target, origin, line)?;
            }
        }
        RrType::Soa => {
            expect_count(rtype, rdata, 7, line)?;
            if let [mname, rname, serial, timers @ ..] = rdata {
                expect_name(rtype, mname, origin, line)?;
                expect_name(rtype, rname, origin, line)?;
                serial.parse::<u32>().map_err(|_| {
                    ZoneParseError::bad_rdata(line, rtype, format!("bad serial {serial}"))
                })?;
                for timer in timers {
                    parse_ttl(timer).ok_or_else(|| {
                        ZoneParseError::bad_rdata(line, rtype, format!("bad timer {timer}"))
                    })?;
                }
            }
        }
        RrType::Caa => {
            if let [flags, tag, _value, ..] = rdata {
                flags.parse::<u8>().map_err(|_| {
                    ZoneParseError::bad_rdata(line, rtype, format!("bad flags {flags}"))
                })?;
                if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return Err(ZoneParseError::bad_rdata(
                        line,
                        rtype,
                        format!("bad tag {tag}"),
                    ));
                }
            } else {
                return Err(ZoneParseError::bad_rdata(
                    line,
                    rtype,
                    "expected flags, tag and value",
                ));
            }
        }
        _ => {
            if rdata.is_empty() {
                return Err(ZoneParseError::bad_rdata(line, rtype, "missing rdata"));
            }
        }
    }

    Ok(())
}
