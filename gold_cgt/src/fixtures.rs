//! Hand-rolled CGT byte-buffer assembly, gated behind the `test-support`
//! feature. There is no grammar-authoring pipeline in scope to produce real
//! `.cgt`/`.egt` files from a grammar source, so the workspace's own tests
//! (and `gold`'s end-to-end scenario tests) assemble minimal wire-format
//! buffers directly, the way `tps_minicbor`'s decoder tests hand-assemble
//! raw CBOR byte sequences.

/// Appends one UTF-16-LE code unit, little-endian.
fn push_u16(buf: &mut Vec<u8>, v: u16) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn push_zstring(buf: &mut Vec<u8>, s: &str) {
    for unit in s.encode_utf16() {
        push_u16(buf, unit);
    }
    push_u16(buf, 0);
}

/// Builds a CGT record by record, tracking the field count for the `M`
/// header automatically.
#[derive(Default)]
pub struct RecordBuilder {
    fields: Vec<u8>,
    count: u16,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn byte(mut self, v: u8) -> Self {
        self.fields.push(b'b');
        self.fields.push(v);
        self.count += 1;
        self
    }

    pub fn bool(mut self, v: bool) -> Self {
        self.fields.push(b'B');
        self.fields.push(v as u8);
        self.count += 1;
        self
    }

    pub fn empty(mut self) -> Self {
        self.fields.push(b'E');
        self.count += 1;
        self
    }

    pub fn u16(mut self, v: u16) -> Self {
        self.fields.push(b'I');
        push_u16(&mut self.fields, v);
        self.count += 1;
        self
    }

    pub fn string(mut self, s: &str) -> Self {
        self.fields.push(b'S');
        push_zstring(&mut self.fields, s);
        self.count += 1;
        self
    }

    /// Finishes the record, writing the `M` header and field count followed
    /// by every field appended so far, onto `out`.
    pub fn finish(self, out: &mut Vec<u8>) {
        out.push(b'M');
        push_u16(out, self.count);
        out.extend_from_slice(&self.fields);
    }
}

/// Assembles a whole CGT file: the magic header followed by records.
pub struct CgtFixtureBuilder {
    buf: Vec<u8>,
}

impl CgtFixtureBuilder {
    pub fn new_v1() -> Self {
        let mut buf = Vec::new();
        push_zstring(&mut buf, "GOLD Parser Tables/v1.0");
        Self { buf }
    }

    pub fn new_v5() -> Self {
        let mut buf = Vec::new();
        push_zstring(&mut buf, "GOLD Parser Tables/v5.0");
        Self { buf }
    }

    pub fn record(&mut self, record_type: u8, rest: RecordBuilder) -> &mut Self {
        let mut wrapped = RecordBuilder::new().byte(record_type);
        wrapped.fields.extend_from_slice(&rest.fields);
        wrapped.count += rest.count;
        wrapped.finish(&mut self.buf);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
