/// Holds a `loading` flag up for as long as it lives.
///
/// Dropping the guard clears the flag, including when the future that owns
/// it is cancelled mid-request.
pub(crate) struct LoadingGuard<'a> {
    flag: &'a mut bool,
}

impl<'a> LoadingGuard<'a> {
    pub(crate) fn set(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}
