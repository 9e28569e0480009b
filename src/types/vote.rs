use serde::Serialize;

use super::id::PostId;

/// `1` likes a post, `0` takes the like back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteDirection {
    Unlike,
    Like,
}

impl VoteDirection {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Unlike => 0,
            Self::Like => 1,
        }
    }
}

impl Serialize for VoteDirection {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.as_u8())
    }
}

/// **ROUTE**: `POST /vote/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Vote {
    pub post_id: PostId,
    pub dir: VoteDirection,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::Token;

    #[test]
    fn serializes_direction_as_integer() {
        let vote = Vote {
            post_id: PostId::new(9),
            dir: VoteDirection::Like,
        };
        serde_test::assert_ser_tokens(
            &vote,
            &[
                Token::Struct { name: "Vote", len: 2 },
                Token::Str("post_id"),
                Token::U64(9),
                Token::Str("dir"),
                Token::U8(1),
                Token::StructEnd,
            ],
        );
        serde_test::assert_ser_tokens(&VoteDirection::Unlike, &[Token::U8(0)]);
    }
}
