/// Hand-assembled `multipart/form-data` bodies for route tests.
pub struct MultipartBody {
    buf: Vec<u8>,
}

pub const BOUNDARY: &str = "----uploadproxytestboundary";

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    pub fn file(
        mut self,
        field: &str,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> Self {
        self.part_header(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}",
            field, file_name, content_type
        ));
        self.part_body(content);
        self
    }

    /// A file-like part whose disposition carries no `filename`.
    pub fn file_without_name(mut self, field: &str, content: &[u8]) -> Self {
        self.part_header(&format!(
            "Content-Disposition: form-data; name=\"{}\"\r\nContent-Type: application/octet-stream",
            field
        ));
        self.part_body(content);
        self
    }

    pub fn text(mut self, field: &str, value: &str) -> Self {
        self.part_header(&format!(
            "Content-Disposition: form-data; name=\"{}\"",
            field
        ));
        self.part_body(value.as_bytes());
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.buf
    }

    fn part_header(&mut self, headers: &str) {
        self.buf
            .extend_from_slice(format!("--{}\r\n{}\r\n\r\n", BOUNDARY, headers).as_bytes());
    }

    fn part_body(&mut self, content: &[u8]) {
        self.buf.extend_from_slice(content);
        self.buf.extend_from_slice(b"\r\n");
    }
}
