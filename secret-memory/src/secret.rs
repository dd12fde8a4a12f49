use std::fmt;

use rand::{Fill as Randomize, Rng};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Storage for secret data
///
/// The backing bytes live on the heap and are overwritten with zeroes
/// before the memory is released, including on panic-driven unwinding.
pub struct Secret<const N: usize> {
    storage: Box<[u8; N]>,
}

impl<const N: usize> Secret<N> {
    /// Returns a new [Secret] that is zero initialized
    pub fn zero() -> Self {
        Self {
            storage: Box::new([0u8; N]),
        }
    }

    /// Copies `slice` into fresh secret storage
    ///
    /// # Panics
    ///
    /// If the slice is not exactly `N` bytes long.
    pub fn from_slice(slice: &[u8]) -> Self {
        let mut new_self = Self::zero();
        new_self.secret_mut().copy_from_slice(slice);
        new_self
    }

    /// Returns a new [Secret] that is randomized
    pub fn random() -> Self {
        let mut new_self = Self::zero();
        new_self.randomize();
        new_self
    }

    /// Sets all bytes of an existing secret to random values
    pub fn randomize(&mut self) {
        self.try_fill(&mut rand::thread_rng()).unwrap()
    }

    /// Borrows the data
    pub fn secret(&self) -> &[u8; N] {
        &self.storage
    }

    /// Borrows the data mutably
    pub fn secret_mut(&mut self) -> &mut [u8; N] {
        &mut self.storage
    }
}

impl<const N: usize> Randomize for Secret<N> {
    fn try_fill<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), rand::Error> {
        // Zeroize first so the compiler barriers of the zeroize crate keep
        // the old value from surviving the overwrite.
        self.zeroize();
        self.secret_mut().try_fill(rng)
    }
}

impl<const N: usize> ZeroizeOnDrop for Secret<N> {}
impl<const N: usize> Zeroize for Secret<N> {
    fn zeroize(&mut self) {
        self.storage.as_mut_slice().zeroize()
    }
}

impl<const N: usize> Drop for Secret<N> {
    fn drop(&mut self) {
        self.zeroize()
    }
}

impl<const N: usize> Clone for Secret<N> {
    fn clone(&self) -> Self {
        Self::from_slice(self.secret())
    }
}

/// The Debug implementation of [Secret] does not reveal the secret data,
/// instead a placeholder `<SECRET>` is used
impl<const N: usize> fmt::Debug for Secret<N> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("<SECRET>")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn starts_zeroed() {
        let s: Secret<48> = Secret::zero();
        assert_eq!(s.secret(), &[0u8; 48]);
    }

    #[test]
    fn clone_copies_value() {
        let s: Secret<16> = Secret::random();
        assert_eq!(s.clone().secret(), s.secret());
    }

    #[test]
    fn randomize_changes_value() {
        let mut s: Secret<32> = Secret::zero();
        s.randomize();
        assert_ne!(s.secret(), &[0u8; 32]);
    }

    #[test]
    fn debug_reveals_nothing() {
        let s: Secret<32> = Secret::random();
        assert_eq!(format!("{s:?}"), "<SECRET>");
    }

    #[test]
    fn zeroize_clears_value() {
        let mut s: Secret<32> = Secret::random();
        s.zeroize();
        assert_eq!(s.secret(), &[0u8; 32]);
    }
}
