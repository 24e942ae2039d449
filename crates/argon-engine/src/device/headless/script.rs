use super::UniformValue;

/// Declared type of an active uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UniformKind {
    Bool,
    Int,
    Float,
    Mat4,
    Sampler2D,
}

impl UniformKind {
    /// Whether a `glUniform*` call of `value`'s shape may write this uniform.
    pub(super) fn accepts(self, value: &UniformValue) -> bool {
        match value {
            UniformValue::Int(_) => {
                matches!(self, UniformKind::Bool | UniformKind::Int | UniformKind::Sampler2D)
            }
            UniformValue::Float(_) => self == UniformKind::Float,
            UniformValue::Mat4(_) => self == UniformKind::Mat4,
        }
    }
}

/// What the headless driver reports for one shader source.
///
/// The device compiles nothing. Sources are matched verbatim against the
/// registered scripts; an unscripted source compiles cleanly and declares no
/// uniforms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShaderScript {
    pub(super) compile_log: Option<String>,
    pub(super) link_log: Option<String>,
    pub(super) uniforms: Vec<(String, UniformKind)>,
}

impl ShaderScript {
    pub fn compiles() -> Self {
        Self::default()
    }

    /// Compilation fails with `log` as the info log.
    pub fn fails_to_compile(log: impl Into<String>) -> Self {
        Self {
            compile_log: Some(log.into()),
            ..Self::default()
        }
    }

    /// Declares an active uniform. Locations follow declaration order, vertex
    /// stage first.
    pub fn with_uniform(mut self, name: impl Into<String>, kind: UniformKind) -> Self {
        self.uniforms.push((name.into(), kind));
        self
    }

    /// Any program this stage is linked into fails with `log`.
    pub fn with_link_error(mut self, log: impl Into<String>) -> Self {
        self.link_log = Some(log.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_uploads_cover_bools_and_samplers() {
        let int = UniformValue::Int(1);
        assert!(UniformKind::Bool.accepts(&int));
        assert!(UniformKind::Sampler2D.accepts(&int));
        assert!(!UniformKind::Float.accepts(&int));
        assert!(!UniformKind::Int.accepts(&UniformValue::Mat4([0.0; 16])));
    }

    #[test]
    fn builders_record_outcome() {
        let script = ShaderScript::compiles()
            .with_uniform("mvp", UniformKind::Mat4)
            .with_link_error("error: boom\n");
        assert_eq!(script.compile_log, None);
        assert_eq!(script.link_log.as_deref(), Some("error: boom\n"));
        assert_eq!(script.uniforms, vec![("mvp".to_string(), UniformKind::Mat4)]);
    }
}
