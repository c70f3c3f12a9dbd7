//! Middleware modules for request processing.
//!
//! - [`auth`]: bearer token verification, the [`AuthUser`](auth::AuthUser)
//!   extractor and the `require_auth` layer
//! - [`role`]: the `require_admin` layer
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. The header is split into scheme and token, the scheme must be `Bearer`
//!    (any case)
//! 3. The JWT signature and expiry are verified
//! 4. The account is loaded from storage and its current role attached to
//!    the request
//! 5. `require_admin` additionally rejects non-admin callers with 403
//!
//! Failures short-circuit with the JSON error envelope:
//!
//! | Condition | Status | Message |
//! |-----------|--------|---------|
//! | No header | 401 | `Token não fornecido` |
//! | Not exactly two parts | 401 | `Erro no formato do token` |
//! | Scheme other than Bearer | 401 | `Formato de token inválido` |
//! | Bad signature or expired | 401 | `Token inválido` |
//! | Account no longer exists | 401 | `Usuário não encontrado` |
//! | Not an admin | 403 | `Acesso permitido apenas para administradores` |

pub mod auth;
pub mod role;
