/// A named response fixture, measured under one of the size groups.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    file: TestFile,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, file: TestFile) -> Self {
        Self { name, group, file }
    }

    pub fn small(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Small, file)
    }

    pub fn large(name: &'static str, file: TestFile) -> Self {
        Self::new(name, TestGroup::Large, file)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }
}

/// A captured response: the header block and the body, kept apart the way a
/// transport hands them over.
#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    head: &'static str,
    body: &'static str,
}

impl TestFile {
    pub const fn new(head: &'static str, body: &'static str) -> Self {
        Self { head, body }
    }

    pub fn head(&self) -> &'static str {
        self.head
    }

    pub fn body(&self) -> &'static str {
        self.body
    }

    pub fn len(&self) -> usize {
        self.head.len() + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Large,
}

impl TestGroup {
    /// Prefix of the benchmark id, so reports sort cases by size.
    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Large => "large",
        }
    }
}
