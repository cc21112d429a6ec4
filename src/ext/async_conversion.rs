/// Fallible conversion whose work has to be awaited, such as reading a file
/// before its contents can be turned into a value.
///
/// # Examples
///
/// ```ignore
/// let payload = FilePayload::async_try_from(UploadSource::new(path, limit)).await?;
/// ```
pub trait AsyncTryFrom<T>: Sized {
    type Error;

    async fn async_try_from(value: T) -> Result<Self, Self::Error>;
}

/// Counterpart of [`AsyncTryFrom`], implemented for every pair that has it.
pub trait AsyncTryInto<T> {
    type Error;

    async fn async_try_into(self) -> Result<T, Self::Error>;
}

impl<T, U> AsyncTryInto<U> for T
where
    U: AsyncTryFrom<T>,
{
    type Error = U::Error;

    async fn async_try_into(self) -> Result<U, Self::Error> {
        U::async_try_from(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Even(u32);

    impl AsyncTryFrom<u32> for Even {
        type Error = u32;

        async fn async_try_from(value: u32) -> Result<Self, Self::Error> {
            if value % 2 == 0 { Ok(Even(value)) } else { Err(value) }
        }
    }

    #[test]
    fn test_async_try_from() {
        futures::executor::block_on(async {
            assert_eq!(Even::async_try_from(4).await.map(|e| e.0), Ok(4));
            assert_eq!(Even::async_try_from(5).await.map(|e| e.0), Err(5));
        });
    }

    #[test]
    fn test_async_try_into() {
        futures::executor::block_on(async {
            let even: Result<Even, _> = 8u32.async_try_into().await;
            assert_eq!(even.map(|e| e.0), Ok(8));
        });
    }
}
