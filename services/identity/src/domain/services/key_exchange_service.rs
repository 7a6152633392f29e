//! 密钥协商服务
//!
//! 基于 secp256k1 ECDH 的一次性握手：每次协商生成新鲜密钥对，
//! 服务端保留私钥标量，客户端用共享密钥 AES-256-GCM 加密登录载荷。
//! 私钥材料在首次成功解密后即被消费，不跨登录复用（前向保密）。

use std::collections::HashMap;
use std::time::{Duration, Instant};

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use keygate_common::HandshakeId;
use keygate_errors::{AppError, AppResult};
use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::ecdh::SharedSecret;
use secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

/// AES-GCM nonce 长度（载荷格式：nonce || ciphertext）
const NONCE_LENGTH: usize = 12;

/// 协商结果，返回给客户端
#[derive(Debug, Clone, Serialize)]
pub struct HandshakeOffer {
    pub handshake_id: HandshakeId,
    /// 压缩格式公钥（hex）
    pub server_public_key: String,
}

/// 单次握手的服务端状态
enum HandshakeState {
    /// 等待客户端提交加密载荷
    Pending {
        secret: SecretKey,
        created_at: Instant,
    },
    /// 密钥材料已消费，保留墓碑用于识别重放
    Consumed { consumed_at: Instant },
}

enum Decision {
    Missing,
    AlreadyConsumed,
    Expired,
    Ready(SecretKey),
}

/// 密钥协商服务
pub struct KeyExchangeService {
    secp: Secp256k1<All>,
    ttl: Duration,
    handshakes: RwLock<HashMap<HandshakeId, HandshakeState>>,
}

impl KeyExchangeService {
    pub fn new(ttl: Duration) -> Self {
        Self {
            secp: Secp256k1::new(),
            ttl,
            handshakes: RwLock::new(HashMap::new()),
        }
    }

    /// 发起一次协商：生成新鲜密钥对，返回公钥参数和握手 ID
    pub async fn negotiate(&self) -> HandshakeOffer {
        let secret = loop {
            let mut buf = [0u8; 32];
            OsRng.fill_bytes(&mut buf);
            // from_slice 拒绝全零等非法标量，重新采样即可
            if let Ok(secret) = SecretKey::from_slice(&buf) {
                break secret;
            }
        };
        let public = PublicKey::from_secret_key(&self.secp, &secret);
        let handshake_id = HandshakeId::new();

        let mut handshakes = self.handshakes.write().await;
        Self::sweep(&mut handshakes, self.ttl);
        handshakes.insert(
            handshake_id.clone(),
            HandshakeState::Pending {
                secret,
                created_at: Instant::now(),
            },
        );

        tracing::debug!(%handshake_id, "key exchange negotiated");

        HandshakeOffer {
            handshake_id,
            server_public_key: hex::encode(public.serialize()),
        }
    }

    /// 用存储的私钥标量和客户端公钥推导共享密钥并解密载荷
    ///
    /// 首次成功解密后密钥材料被删除；同一握手 ID 的再次调用
    /// 返回 `HandshakeAlreadyConsumed`。
    pub async fn decrypt(
        &self,
        handshake_id: &HandshakeId,
        client_public_key: &str,
        payload: &str,
    ) -> AppResult<String> {
        let client_public = hex::decode(client_public_key)
            .ok()
            .and_then(|bytes| PublicKey::from_slice(&bytes).ok())
            .ok_or_else(|| AppError::validation("Malformed client public key"))?;

        let payload = BASE64
            .decode(payload)
            .map_err(|_| AppError::validation("Malformed encrypted payload"))?;
        if payload.len() <= NONCE_LENGTH {
            return Err(AppError::validation("Encrypted payload is too short"));
        }

        let mut handshakes = self.handshakes.write().await;

        let decision = match handshakes.get(handshake_id) {
            None => Decision::Missing,
            Some(HandshakeState::Consumed { .. }) => Decision::AlreadyConsumed,
            Some(HandshakeState::Pending { created_at, .. })
                if created_at.elapsed() > self.ttl =>
            {
                Decision::Expired
            }
            Some(HandshakeState::Pending { secret, .. }) => Decision::Ready(*secret),
        };

        let secret = match decision {
            Decision::Missing => return Err(AppError::HandshakeExpired),
            Decision::Expired => {
                handshakes.remove(handshake_id);
                return Err(AppError::HandshakeExpired);
            }
            Decision::AlreadyConsumed => {
                tracing::warn!(%handshake_id, "handshake replay detected");
                return Err(AppError::HandshakeAlreadyConsumed);
            }
            Decision::Ready(secret) => secret,
        };

        let shared = SharedSecret::new(&client_public, &secret);
        let key = Sha256::digest(shared.secret_bytes());
        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));

        let (nonce, ciphertext) = payload.split_at(NONCE_LENGTH);
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| AppError::validation("Unable to decrypt payload"))?;
        let plaintext = String::from_utf8(plaintext)
            .map_err(|_| AppError::validation("Decrypted payload is not valid UTF-8"))?;

        // 解密成功才消费密钥材料
        handshakes.insert(
            handshake_id.clone(),
            HandshakeState::Consumed {
                consumed_at: Instant::now(),
            },
        );

        Ok(plaintext)
    }

    /// 清理超龄条目（含墓碑）
    fn sweep(handshakes: &mut HashMap<HandshakeId, HandshakeState>, ttl: Duration) {
        handshakes.retain(|_, state| match state {
            HandshakeState::Pending { created_at, .. } => created_at.elapsed() <= ttl,
            HandshakeState::Consumed { consumed_at } => consumed_at.elapsed() <= ttl,
        });
    }
}
