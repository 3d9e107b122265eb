/// A sub-resource owned by an editor: the text area, a toolbar or a hoverbar.
///
/// The editor calls `destroy` once during its own teardown. A component that
/// can be destroyed more than once through other paths is responsible for
/// guarding that itself. While `destroy` runs the component is detached from
/// the editor, so calling back into the editor is allowed and reports the
/// part as absent.
pub trait Component {
    fn destroy(&mut self) -> Result<(), String>;
}

impl<F> Component for F
where
    F: FnMut() -> Result<(), String>,
{
    fn destroy(&mut self) -> Result<(), String> {
        self()
    }
}
